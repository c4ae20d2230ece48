use crate::context::{self, RequestContext};
use crate::env::{env_or, GCP_PROJECT_ENV, GOOGLE_CLOUD_PROJECT_ENV};
use crate::error::FormatError;
use crate::record::{LogEntry, LogEvent};
use crate::status::GRPC_STATUS_BLANK_MESSAGE;
use crate::{http, location, status};
use std::backtrace::Backtrace;
use std::collections::BTreeMap;

/// `@type` that makes Error Reporting pick up an entry.
pub const ERROR_TYPE: &str =
    "type.googleapis.com/google.devtools.clouderrorreporting.v1beta1.ReportedErrorEvent";

/// Turns [`LogEvent`]s into Cloud Logging structured JSON lines.
///
/// A formatter holds only read-only configuration and can be shared freely
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    project_id: String,
    context_keys: BTreeMap<String, String>,
}

impl Formatter {
    /// `project_id` is the Google Cloud project, e.g. `"my-super-project"`.
    /// It is needed to build fully-qualified trace names.
    pub fn new(project_id: impl Into<String>) -> Self {
        Formatter { project_id: project_id.into(), context_keys: BTreeMap::new() }
    }

    /// Build a formatter for the project named by `GOOGLE_CLOUD_PROJECT`, or
    /// `GCP_PROJECT` when the former is unset.
    pub fn from_env() -> Self {
        let fallback = env_or(GCP_PROJECT_ENV, "");
        Formatter::new(env_or(GOOGLE_CLOUD_PROJECT_ENV, &fallback))
    }

    /// Surface the context value stored under `key` as the `label` field of
    /// `additional_info`.
    pub fn with_context_key(mut self, label: impl Into<String>, key: impl Into<String>) -> Self {
        self.context_keys.insert(label.into(), key.into());
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn context_keys(&self) -> &BTreeMap<String, String> {
        &self.context_keys
    }

    /// Format one event as a single JSON line, trailing newline included.
    ///
    /// See <https://cloud.google.com/logging/docs/reference/v2/rest/v2/LogEntry>.
    pub fn format(&self, event: LogEvent<'_>) -> Result<Vec<u8>, FormatError> {
        let entry = self.build_entry(event);
        let mut serialized = serde_json::to_vec(&entry)?;
        serialized.push(b'\n');
        Ok(serialized)
    }

    /// Build the entry without serializing it.
    pub fn build_entry(&self, event: LogEvent<'_>) -> LogEntry {
        let LogEvent { level, mut message, mut fields, caller, context: ambient } = event;

        if let Some(ctx) = ambient {
            context::inject(ctx, &self.context_keys, &mut fields);
        }

        let http_request = http::extract(&mut fields);
        let grpc_status = status::extract(&mut fields);
        let convenience = status::take_convenience_marker(&mut fields);
        let source_location = location::resolve(caller.as_ref(), convenience.as_ref());

        if let Some(grpc) = &grpc_status {
            if message == GRPC_STATUS_BLANK_MESSAGE {
                message = grpc.message.clone();
            }
        }

        let mut error_type = None;
        if level.is_error() {
            error_type = Some(ERROR_TYPE);
            message = format!("{}\n{}", message, Backtrace::force_capture());
        }

        LogEntry {
            message,
            severity: level.severity(),
            additional_info: fields,
            trace: ambient.and_then(|ctx| self.trace_name(ctx)),
            error_type,
            source_location,
            http_request,
            grpc_status,
        }
    }

    fn trace_name(&self, context: &dyn RequestContext) -> Option<String> {
        let trace_id = context.trace_id().filter(|id| !id.is_empty())?;
        Some(format!("projects/{}/traces/{}", self.project_id, trace_id))
    }
}
