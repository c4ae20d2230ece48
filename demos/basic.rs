use tracing::{error, info, info_span, warn};

use tracing_gcp_log::init::{init_tracing_with_config, LayerConfig};
use tracing_gcp_log::Formatter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LayerConfig {
        formatter: Formatter::new("my-super-project").with_context_key("session_id", "session"),
        source_location: true,
        ..LayerConfig::default()
    };
    init_tracing_with_config(config)?;

    info!("Hello");
    info!(animal = "walrus", number = 1, "My info message here");

    let span = info_span!(
        "request",
        trace_id = "31323334353637383961626364656667",
        session = "1239828228"
    );
    span.in_scope(|| {
        info!(requestMethod = "GET", requestUrl = "/v1/users/42", latency = "0.012s", "served");
        warn!(retries = 3, "upstream flaky");
    });

    error!(user_id = 42, reason = "invalid password", "authentication failed");
    Ok(())
}
