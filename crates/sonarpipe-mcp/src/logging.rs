use tracing_subscriber::EnvFilter;

/// Structured logs go to stderr; stdout belongs to the MCP channel.
///
/// Filter comes from `SONARPIPE_LOG` (same syntax as `RUST_LOG`), default `info`.
pub(crate) fn init() {
    let filter = EnvFilter::try_from_env("SONARPIPE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
