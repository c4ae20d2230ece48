//! Environment variable names used by this crate for convenient
//! configuration from services running on Google Cloud.
//!
//! These are purely helpers; the formatter itself never reads the
//! environment unless asked to through [`Formatter::from_env`](crate::formatter::Formatter::from_env).

/// Project id, set by most Google Cloud runtimes.
pub const GOOGLE_CLOUD_PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// Project id as set by older Cloud Functions runtimes.
pub const GCP_PROJECT_ENV: &str = "GCP_PROJECT";

/// Set to `1` or `true` to report source locations from [`LayerConfig::from_env`](crate::init::LayerConfig::from_env).
pub const LOG_SOURCE_LOCATION_ENV: &str = "LOG_SOURCE_LOCATION";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a boolean flag; `1`, `true` and `yes` (any case) count as set.
pub fn env_flag(key: &str) -> bool {
    matches!(env_or(key, "").to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
