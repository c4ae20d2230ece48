/// Error returned by [`Formatter::format`](crate::formatter::Formatter::format).
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}
