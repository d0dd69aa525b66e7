use tracing_subscriber::EnvFilter;

/// Log to stderr so `--json` output on stdout stays machine-readable.
/// `RUST_LOG` picks the filter (default `warn`); `LOG_FORMAT=json` emits JSON lines.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if json_logs {
        builder.with_target(false).json().init();
    } else {
        builder.init();
    }
}
