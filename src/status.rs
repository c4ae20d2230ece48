//! Structured RPC statuses and their extraction from event fields.
//!
//! Attach an error under [`GRPC_STATUS`] and, if it is (or wraps) a
//! [`Status`], the entry gets a `grpc` block instead of carrying the error
//! in `additional_info`. Logging [`GRPC_STATUS_BLANK_MESSAGE`] as the
//! message takes the message from the status.

use crate::record::{Fields, FieldValue, GrpcStatus};
use std::error::Error;
use std::fmt;

/// Field holding the error to decode.
pub const GRPC_STATUS: &str = "grpcStatus";

/// Message meaning "use the status message instead".
pub const GRPC_STATUS_BLANK_MESSAGE: &str = "!";

/// Set only by the convenience reporters in [`crate::report`]. Its value is
/// the reporter's call site as `"<file>:<line>"`, prefixed with
/// `"<function>@"` when the calling module is known.
pub const GRPC_STATUS_CALLED_FROM_CONVENIENCE: &str = "grpcStatusCalledFromConvenience";

/// Canonical gRPC status codes.
///
/// See <https://grpc.github.io/grpc/core/md_doc_statuscodes.html>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Code {
    pub const fn to_int(self) -> i32 {
        match self {
            Code::Ok => 0,
            Code::Cancelled => 1,
            Code::Unknown => 2,
            Code::InvalidArgument => 3,
            Code::DeadlineExceeded => 4,
            Code::NotFound => 5,
            Code::AlreadyExists => 6,
            Code::PermissionDenied => 7,
            Code::ResourceExhausted => 8,
            Code::FailedPrecondition => 9,
            Code::Aborted => 10,
            Code::OutOfRange => 11,
            Code::Unimplemented => 12,
            Code::Internal => 13,
            Code::Unavailable => 14,
            Code::DataLoss => 15,
            Code::Unauthenticated => 16,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Code::Ok => "OK",
            Code::Cancelled => "Canceled",
            Code::Unknown => "Unknown",
            Code::InvalidArgument => "InvalidArgument",
            Code::DeadlineExceeded => "DeadlineExceeded",
            Code::NotFound => "NotFound",
            Code::AlreadyExists => "AlreadyExists",
            Code::PermissionDenied => "PermissionDenied",
            Code::ResourceExhausted => "ResourceExhausted",
            Code::FailedPrecondition => "FailedPrecondition",
            Code::Aborted => "Aborted",
            Code::OutOfRange => "OutOfRange",
            Code::Unimplemented => "Unimplemented",
            Code::Internal => "Internal",
            Code::Unavailable => "Unavailable",
            Code::DataLoss => "DataLoss",
            Code::Unauthenticated => "Unauthenticated",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An RPC status: code, message and an ordered list of detail payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    code: Code,
    message: String,
    details: Vec<serde_json::Value>,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Status { code, message: message.into(), details: Vec::new() }
    }

    pub fn with_details(mut self, details: Vec<serde_json::Value>) -> Self {
        self.details = details;
        self
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[serde_json::Value] {
        &self.details
    }

    /// Find a `Status` in `err` or anywhere down its `source()` chain.
    pub fn from_error<'e>(err: &'e (dyn Error + 'static)) -> Option<&'e Status> {
        let mut current = Some(err);
        while let Some(err) = current {
            if let Some(status) = err.downcast_ref::<Status>() {
                return Some(status);
            }
            current = err.source();
        }
        None
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc error: code = {} desc = {}", self.code, self.message)
    }
}

impl Error for Status {}

/// Pull the [`GRPC_STATUS`] field out of `fields` if it holds a decodable
/// status.
///
/// Anything else under the key stays in `fields` untouched.
pub(crate) fn extract(fields: &mut Fields) -> Option<GrpcStatus> {
    let block = match fields.get(GRPC_STATUS)? {
        FieldValue::Error(err) => {
            let err: &(dyn Error + 'static) = &**err;
            to_block(Status::from_error(err)?)
        }
        FieldValue::Json(_) => return None,
    };
    fields.remove(GRPC_STATUS);
    Some(block)
}

/// Remove the convenience marker, returning its value. The marker never
/// reaches the output.
pub(crate) fn take_convenience_marker(fields: &mut Fields) -> Option<FieldValue> {
    fields.remove(GRPC_STATUS_CALLED_FROM_CONVENIENCE)
}

fn to_block(status: &Status) -> GrpcStatus {
    let details = if status.details().is_empty() {
        None
    } else {
        Some(serde_json::Value::Array(status.details().to_vec()).to_string())
    };
    GrpcStatus {
        code: status.code().to_string(),
        message: status.message().to_string(),
        details,
    }
}
