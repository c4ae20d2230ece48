use crate::context::RequestContext;
use crate::severity::Level;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Attribute map of a [`LogEvent`]. Keys are kept sorted so the
/// `additional_info` block serializes deterministically.
pub type Fields = BTreeMap<String, FieldValue>;

/// A single attribute value.
///
/// Most values are plain JSON. Error values are kept as errors so the
/// formatter can try to decode a structured status out of them.
#[derive(Clone)]
pub enum FieldValue {
    Json(serde_json::Value),
    Error(Arc<dyn Error + Send + Sync + 'static>),
}

impl FieldValue {
    pub fn error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        FieldValue::Error(Arc::new(err))
    }

    /// `false` for null, empty strings and `false`, mirroring what counts as
    /// "not set" for a trigger key.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Json(serde_json::Value::Null) => false,
            FieldValue::Json(serde_json::Value::Bool(b)) => *b,
            FieldValue::Json(serde_json::Value::String(s)) => !s.is_empty(),
            _ => true,
        }
    }

    /// Text rendering used when a value is lifted into a string-typed schema
    /// field: strings verbatim, everything else through its JSON or
    /// `Display` form. An error whose `Display` fails renders as
    /// [`UNPRINTABLE_ERROR`].
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Json(serde_json::Value::String(s)) => s.clone(),
            FieldValue::Json(other) => other.to_string(),
            FieldValue::Error(err) => {
                render(err.as_ref()).unwrap_or_else(|_| UNPRINTABLE_ERROR.to_string())
            }
        }
    }
}

/// Placeholder text for errors whose `Display` implementation fails.
pub const UNPRINTABLE_ERROR: &str = "<unprintable error>";

/// `Display` into a `String`, surfacing `fmt::Error` instead of panicking
/// the way `ToString` does.
pub(crate) fn render<T: fmt::Display + ?Sized>(value: &T) -> Result<String, fmt::Error> {
    let mut text = String::new();
    write!(text, "{}", value)?;
    Ok(text)
}

/// Snapshot of an error only available by reference, such as one handed to
/// a `tracing` visitor. A failed `Display` is replayed as a failure.
#[derive(Debug, Clone)]
pub struct CapturedError {
    text: Option<String>,
}

impl CapturedError {
    pub fn capture(err: &(dyn Error + 'static)) -> Self {
        CapturedError { text: render(err).ok() }
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => f.write_str(text),
            None => Err(fmt::Error),
        }
    }
}

impl Error for CapturedError {}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Json(value) => write!(f, "{}", value),
            FieldValue::Error(err) => match render(err.as_ref()) {
                Ok(text) => write!(f, "Error({})", text),
                Err(_) => write!(f, "Error({})", UNPRINTABLE_ERROR),
            },
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Json(a), FieldValue::Json(b)) => a == b,
            (FieldValue::Error(a), FieldValue::Error(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Json(value) => value.serialize(serializer),
            FieldValue::Error(err) => {
                let text = render(err.as_ref()).map_err(|_| {
                    <S::Error as serde::ser::Error>::custom("error value failed to format itself")
                })?;
                serializer.serialize_str(&text)
            }
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Json(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Json(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Json(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Json(value.into())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Json(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Json(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Json(value.into())
    }
}

/// Source location of the statement that emitted an event, as reported by
/// the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerLocation {
    pub file: String,
    pub line: Option<u32>,
    pub function: Option<String>,
}

/// One emission handed to [`Formatter::format`](crate::formatter::Formatter::format).
///
/// The formatter consumes the event: keys claimed by a typed block are
/// removed from `fields` as part of the transformation.
pub struct LogEvent<'a> {
    pub level: Level,
    pub message: String,
    pub fields: Fields,
    pub caller: Option<CallerLocation>,
    pub context: Option<&'a dyn RequestContext>,
}

impl<'a> LogEvent<'a> {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        LogEvent {
            level,
            message: message.into(),
            fields: Fields::new(),
            caller: None,
            context: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_caller(mut self, caller: CallerLocation) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_context(mut self, context: &'a dyn RequestContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// A Cloud Logging structured entry.
///
/// See <https://cloud.google.com/logging/docs/structured-logging> for the
/// special fields the logging agent recognizes.
#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub message: String,
    pub severity: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_info: Fields,
    #[serde(rename = "logging.googleapis.com/trace", skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<&'static str>,
    #[serde(
        rename = "logging.googleapis.com/sourceLocation",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_location: Option<SourceLocation>,
    #[serde(rename = "httpRequest", skip_serializing_if = "Option::is_none")]
    pub http_request: Option<HttpRequest>,
    #[serde(rename = "grpc", skip_serializing_if = "Option::is_none")]
    pub grpc_status: Option<GrpcStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_method: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub latency: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GrpcStatus {
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness() {
        assert!(!FieldValue::from("").is_truthy());
        assert!(!FieldValue::from(false).is_truthy());
        assert!(!FieldValue::Json(serde_json::Value::Null).is_truthy());
        assert!(FieldValue::from("GET").is_truthy());
        assert!(FieldValue::from(0i64).is_truthy());
    }

    #[test]
    fn text_rendering() {
        assert_eq!(FieldValue::from("1.5s").to_text(), "1.5s");
        assert_eq!(FieldValue::from(250u64).to_text(), "250");
        assert_eq!(FieldValue::Json(json!({"a": 1})).to_text(), r#"{"a":1}"#);
    }

    #[derive(Debug)]
    struct BadDisplay;

    impl fmt::Display for BadDisplay {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    impl Error for BadDisplay {}

    #[test]
    fn failing_display_is_a_serialize_error() {
        let value = FieldValue::error(BadDisplay);
        assert!(serde_json::to_string(&value).is_err());
        assert_eq!(value.to_text(), UNPRINTABLE_ERROR);
        assert_eq!(format!("{:?}", value), "Error(<unprintable error>)");
    }

    #[test]
    fn captured_error_replays_display() {
        let ok = CapturedError::capture(&std::io::Error::new(std::io::ErrorKind::Other, "eof"));
        assert_eq!(ok.to_string(), "eof");
        assert!(render(&CapturedError::capture(&BadDisplay)).is_err());
    }

    #[test]
    fn error_values_serialize_as_text() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let value = FieldValue::error(err);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#""disk on fire""#);
    }
}
