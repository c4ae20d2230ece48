use crate::env::{env_flag, LOG_SOURCE_LOCATION_ENV};
use crate::error::InitError;
use crate::formatter::Formatter;
use crate::layer::{GcpLogLayer, DEFAULT_TRACE_FIELD};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the logging layer.
///
/// **Fields**
/// - `formatter`: project id and context keys used to build entries.
/// - `source_location`: report the file and line of every event.
/// - `trace_field`: span field carrying the trace id.
/// - `enable_stdout`: if `true`, a human-readable
///   `tracing_subscriber::fmt::Layer` writing to stderr is added next to the
///   JSON output, handy when running locally.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub formatter: Formatter,
    pub source_location: bool,
    pub trace_field: String,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            formatter: Formatter::default(),
            source_location: false,
            trace_field: DEFAULT_TRACE_FIELD.to_string(),
            enable_stdout: false,
        }
    }
}

impl LayerConfig {
    /// Project id from `GOOGLE_CLOUD_PROJECT` / `GCP_PROJECT`, source
    /// locations from `LOG_SOURCE_LOCATION`.
    pub fn from_env() -> Self {
        Self {
            formatter: Formatter::from_env(),
            source_location: env_flag(LOG_SOURCE_LOCATION_ENV),
            ..Self::default()
        }
    }

    /// Build the layer described by this config, writing to stdout.
    pub fn layer(&self) -> GcpLogLayer {
        GcpLogLayer::new(self.formatter.clone())
            .with_source_location(self.source_location)
            .with_trace_field(self.trace_field.clone())
    }
}

/// Install a global `tracing` subscriber writing Cloud Logging entries to
/// stdout.
///
/// **Parameters**
/// - `config`: [`LayerConfig`] controlling formatting and extra output.
///
/// **Errors**
///
/// [`InitError::AlreadyInstalled`] if a global subscriber was set before.
pub fn init_tracing_with_config(config: LayerConfig) -> Result<(), InitError> {
    let layer = config.layer();

    // The two variants have different subscriber types.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Initialize tracing for the given project with defaults.
///
/// Equivalent to calling [`init_tracing_with_config`] with a
/// [`LayerConfig::default`] using `Formatter::new(project_id)`.
pub fn init_tracing(project_id: &str) -> Result<(), InitError> {
    init_tracing_with_config(LayerConfig {
        formatter: Formatter::new(project_id),
        ..LayerConfig::default()
    })
}
