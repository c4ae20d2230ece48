/// Severity of a [`LogEvent`](crate::record::LogEvent), ordered from least
/// to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

// Cloud Logging severities.
const DEFAULT: &str = "INFO";
const SEVERITIES: &[(Level, &str)] = &[
    (Level::Trace, "DEBUG"),
    (Level::Debug, "DEBUG"),
    (Level::Info, "INFO"),
    (Level::Warn, "WARNING"),
    (Level::Error, "ERROR"),
    (Level::Fatal, "CRITICAL"),
    (Level::Panic, "CRITICAL"),
];

impl Level {
    /// Cloud Logging severity string for this level.
    ///
    /// Anything missing from the table is reported as `INFO`.
    pub fn severity(self) -> &'static str {
        SEVERITIES
            .iter()
            .find(|(level, _)| *level == self)
            .map(|(_, severity)| *severity)
            .unwrap_or(DEFAULT)
    }

    /// Whether events at this level are reported to Error Reporting.
    pub fn is_error(self) -> bool {
        self >= Level::Error
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            _ => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_level() {
        assert_eq!(Level::Trace.severity(), "DEBUG");
        assert_eq!(Level::Debug.severity(), "DEBUG");
        assert_eq!(Level::Info.severity(), "INFO");
        assert_eq!(Level::Warn.severity(), "WARNING");
        assert_eq!(Level::Error.severity(), "ERROR");
        assert_eq!(Level::Fatal.severity(), "CRITICAL");
        assert_eq!(Level::Panic.severity(), "CRITICAL");
    }

    #[test]
    fn error_and_above_are_errors() {
        assert!(!Level::Warn.is_error());
        assert!(Level::Error.is_error());
        assert!(Level::Panic.is_error());
    }

    #[test]
    fn converts_tracing_levels() {
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warn);
        assert_eq!(Level::from(tracing::Level::TRACE).severity(), "DEBUG");
    }
}
