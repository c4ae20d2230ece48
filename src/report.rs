//! One-line reporting of RPC errors.
//!
//! ```ignore
//! if let Err(err) = lookup(&id) {
//!     tracing_gcp_log::grpc_info!(&tracing::Span::current(), &err);
//!     return Err(err);
//! }
//! ```
//!
//! The entry takes its message and `grpc` block from the status found in
//! `err`, and its source location from the line calling the reporter.
//!
//! The macros also report the calling module as the location's `function`,
//! like events logged directly. The plain functions only know the file and
//! line of their caller, so their locations carry no `function`.

use crate::location;
use crate::severity::Level;
use crate::status::GRPC_STATUS_BLANK_MESSAGE;
use std::error::Error;
use std::panic::Location;
use tracing::Span;

/// Log `err` at INFO within `span`.
#[track_caller]
pub fn grpc_info(span: &Span, err: &(dyn Error + 'static)) {
    let caller = Location::caller();
    report_from(Level::Info, span, err, &call_site(caller.file(), caller.line(), None));
}

/// Log `err` at WARN within `span`.
#[track_caller]
pub fn grpc_warn(span: &Span, err: &(dyn Error + 'static)) {
    let caller = Location::caller();
    report_from(Level::Warn, span, err, &call_site(caller.file(), caller.line(), None));
}

/// Log `err` at ERROR within `span`. The entry is also sent to Error
/// Reporting, with a stack trace appended to the status message.
#[track_caller]
pub fn grpc_error(span: &Span, err: &(dyn Error + 'static)) {
    let caller = Location::caller();
    report_from(Level::Error, span, err, &call_site(caller.file(), caller.line(), None));
}

/// Like [`grpc_info`](fn@crate::report::grpc_info), also reporting the calling module.
#[macro_export]
macro_rules! grpc_info {
    ($span:expr, $err:expr) => {
        $crate::report::report_from(
            $crate::Level::Info,
            $span,
            $err,
            &$crate::report::call_site(file!(), line!(), Some(module_path!())),
        )
    };
}

/// Like [`grpc_warn`](fn@crate::report::grpc_warn), also reporting the calling module.
#[macro_export]
macro_rules! grpc_warn {
    ($span:expr, $err:expr) => {
        $crate::report::report_from(
            $crate::Level::Warn,
            $span,
            $err,
            &$crate::report::call_site(file!(), line!(), Some(module_path!())),
        )
    };
}

/// Like [`grpc_error`](fn@crate::report::grpc_error), also reporting the calling module.
#[macro_export]
macro_rules! grpc_error {
    ($span:expr, $err:expr) => {
        $crate::report::report_from(
            $crate::Level::Error,
            $span,
            $err,
            &$crate::report::call_site(file!(), line!(), Some(module_path!())),
        )
    };
}

#[doc(hidden)]
pub fn call_site(file: &str, line: u32, function: Option<&str>) -> String {
    location::marker(file, line, function)
}

// `marker` becomes the source location of the entry. Levels below INFO are
// reported at INFO.
#[doc(hidden)]
pub fn report_from(level: Level, span: &Span, err: &(dyn Error + 'static), marker: &str) {
    span.in_scope(|| match level {
        Level::Trace | Level::Debug | Level::Info => tracing::info!(
            grpcStatus = err,
            grpcStatusCalledFromConvenience = marker,
            "{}",
            GRPC_STATUS_BLANK_MESSAGE
        ),
        Level::Warn => tracing::warn!(
            grpcStatus = err,
            grpcStatusCalledFromConvenience = marker,
            "{}",
            GRPC_STATUS_BLANK_MESSAGE
        ),
        Level::Error | Level::Fatal | Level::Panic => tracing::error!(
            grpcStatus = err,
            grpcStatusCalledFromConvenience = marker,
            "{}",
            GRPC_STATUS_BLANK_MESSAGE
        ),
    });
}
