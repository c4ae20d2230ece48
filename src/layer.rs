use crate::context::RequestContext;
use crate::formatter::Formatter;
use crate::record::{CallerLocation, CapturedError, FieldValue, Fields, LogEvent};
use crate::status::Status;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::field::{Field, Visit};
use tracing::{span, Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Span field read as the trace id by default.
pub const DEFAULT_TRACE_FIELD: &str = "trace_id";

/// `tracing_subscriber` layer that writes every event as a Cloud Logging
/// structured JSON line.
///
/// Span fields act as the request context: the configured trace field
/// becomes `logging.googleapis.com/trace`, and the formatter's context keys
/// are looked up among them, innermost span first.
pub struct GcpLogLayer<W = fn() -> std::io::Stdout> {
    formatter: Formatter,
    make_writer: W,
    source_location: bool,
    trace_field: String,
    /// Events written successfully.
    pub formatted_events: Arc<AtomicU64>,
    /// Events that failed to format and were written as plain text.
    pub failed_events: Arc<AtomicU64>,
}

impl GcpLogLayer {
    /// Create a layer writing to stdout.
    pub fn new(formatter: Formatter) -> Self {
        GcpLogLayer {
            formatter,
            make_writer: std::io::stdout,
            source_location: false,
            trace_field: DEFAULT_TRACE_FIELD.to_string(),
            formatted_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<W> GcpLogLayer<W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    /// Send output to `make_writer` instead.
    pub fn with_writer<W2>(self, make_writer: W2) -> GcpLogLayer<W2>
    where
        W2: for<'w> MakeWriter<'w> + 'static,
    {
        GcpLogLayer {
            formatter: self.formatter,
            make_writer,
            source_location: self.source_location,
            trace_field: self.trace_field,
            formatted_events: self.formatted_events,
            failed_events: self.failed_events,
        }
    }

    /// Report the file, line and module of each event. Off by default.
    pub fn with_source_location(mut self, enabled: bool) -> Self {
        self.source_location = enabled;
        self
    }

    /// Span field holding the trace id.
    pub fn with_trace_field(mut self, field: impl Into<String>) -> Self {
        self.trace_field = field.into();
        self
    }

    fn write(&self, bytes: &[u8]) {
        let mut writer = self.make_writer.make_writer();
        if let Err(e) = writer.write_all(bytes) {
            eprintln!("failed to write log entry: {}", e);
        }
    }
}

/// Fields recorded on a span, kept in its extensions.
#[derive(Debug, Clone, Default)]
struct SpanFields(BTreeMap<String, serde_json::Value>);

/// The span scope of one event, innermost span first.
pub struct SpanScope {
    spans: Vec<BTreeMap<String, serde_json::Value>>,
    trace_field: String,
}

impl SpanScope {
    fn lookup(&self, key: &str) -> Option<&serde_json::Value> {
        self.spans.iter().find_map(|fields| fields.get(key))
    }
}

impl RequestContext for SpanScope {
    fn value(&self, key: &str) -> Option<serde_json::Value> {
        self.lookup(key).cloned()
    }

    // An empty trace field means no active trace.
    fn trace_id(&self) -> Option<String> {
        match self.lookup(&self.trace_field)? {
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl<S, W> Layer<S> for GcpLogLayer<W>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        attrs.record(&mut SpanVisitor { fields: &mut fields });
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(fields));
        }
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            values.record(&mut SpanVisitor { fields });
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = Fields::new();
        let mut message = None;
        event.record(&mut FieldVisitor { fields: &mut fields, message: &mut message });

        let spans: Vec<_> = ctx
            .event_scope(event)
            .map(|scope| {
                scope
                    .filter_map(|span| span.extensions().get::<SpanFields>().map(|f| f.0.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let scope = SpanScope { spans, trace_field: self.trace_field.clone() };

        let meta = event.metadata();
        let caller = if self.source_location {
            meta.file().map(|file| CallerLocation {
                file: file.to_string(),
                line: meta.line(),
                function: meta.module_path().map(|s| s.to_string()),
            })
        } else {
            None
        };

        let log_event = LogEvent {
            level: (*meta.level()).into(),
            message: message.unwrap_or_default(),
            fields,
            caller,
            context: if scope.spans.is_empty() { None } else { Some(&scope as &dyn RequestContext) },
        };

        match self.formatter.format(log_event) {
            Ok(bytes) => {
                self.formatted_events.fetch_add(1, Ordering::Relaxed);
                self.write(&bytes);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("failed to format log entry: {}", e);
                self.write(format!("{}: {}\n", meta.level(), meta.name()).as_bytes());
            }
        }
    }
}

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), value.into());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    // Errors carrying a status are kept decodable; anything else is snapshotted.
    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        let value = match Status::from_error(value) {
            Some(status) => FieldValue::error(status.clone()),
            None => FieldValue::error(CapturedError::capture(value)),
        };
        self.fields.insert(field.name().to_string(), value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), format!("{:?}", value).into());
        }
    }
}

struct SpanVisitor<'a> {
    fields: &'a mut BTreeMap<String, serde_json::Value>,
}

impl<'a> Visit for SpanVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields.insert(field.name().to_string(), format!("{:?}", value).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope(spans: Vec<BTreeMap<String, serde_json::Value>>) -> SpanScope {
        SpanScope { spans, trace_field: DEFAULT_TRACE_FIELD.to_string() }
    }

    #[test]
    fn inner_span_shadows_outer() {
        let inner = BTreeMap::from([("user".to_string(), json!("inner"))]);
        let outer = BTreeMap::from([
            ("user".to_string(), json!("outer")),
            ("tenant".to_string(), json!("acme")),
        ]);
        let scope = scope(vec![inner, outer]);
        assert_eq!(scope.value("user"), Some(json!("inner")));
        assert_eq!(scope.value("tenant"), Some(json!("acme")));
        assert_eq!(scope.value("missing"), None);
    }

    #[test]
    fn trace_id_rendering() {
        let numeric = scope(vec![BTreeMap::from([("trace_id".to_string(), json!(42))])]);
        assert_eq!(numeric.trace_id().as_deref(), Some("42"));

        let text = scope(vec![BTreeMap::from([("trace_id".to_string(), json!("abc"))])]);
        assert_eq!(text.trace_id().as_deref(), Some("abc"));

        assert_eq!(scope(vec![]).trace_id(), None);

        let empty = scope(vec![BTreeMap::from([("trace_id".to_string(), json!(""))])]);
        assert_eq!(empty.trace_id(), None);
    }
}
