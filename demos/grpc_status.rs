use tracing::{info, info_span};

use tracing_gcp_log::{grpc_info, init_tracing_with_config, Code, LayerConfig, Status};

fn parse_count(s: &str) -> Result<i32, Status> {
    s.parse::<i32>().map_err(|e| {
        Status::new(Code::InvalidArgument, format!("expected an integer, got '{}': {}", s, e))
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = LayerConfig::from_env();
    config.source_location = true;
    init_tracing_with_config(config)?;

    let span = info_span!("rpc", trace_id = "31323334353637383961626364656667");

    // Tagging the field directly keeps this line as the source location.
    let status = Status::new(Code::NotFound, "blah with key 'myid' not found");
    info!(grpcStatus = &status as &(dyn std::error::Error + 'static), "Blah");

    if let Err(err) = parse_count("definitely not an int") {
        // Message, grpc block and source location all come from here.
        grpc_info(&span, &err);
        // The macro form also reports this module as the function.
        tracing_gcp_log::grpc_warn!(&span, &err);
    }
    Ok(())
}
