//! Format `tracing` events as Google Cloud Logging structured JSON.
//!
//! Reserved fields are lifted into the schema: `requestMethod`,
//! `requestUrl`, `latency` and `responseStatus` become `httpRequest`, an
//! error carrying a [`Status`] under `grpcStatus` becomes `grpc`, and the
//! configured span field becomes `logging.googleapis.com/trace`. Everything
//! else lands in `additional_info`.

pub mod context;
pub mod env;
pub mod error;
pub mod formatter;
pub mod http;
pub mod init;
pub mod layer;
mod location;
pub mod record;
pub mod report;
pub mod severity;
pub mod status;

pub use context::RequestContext;
pub use error::{FormatError, InitError};
pub use formatter::{Formatter, ERROR_TYPE};
pub use init::{init_tracing, init_tracing_with_config, LayerConfig};
pub use layer::GcpLogLayer;
pub use record::{CallerLocation, FieldValue, Fields, LogEntry, LogEvent};
pub use report::{grpc_error, grpc_info, grpc_warn};
pub use severity::Level;
pub use status::{Code, Status, GRPC_STATUS, GRPC_STATUS_BLANK_MESSAGE};
