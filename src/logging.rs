use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter (e.g. `debug`).
pub const LOG_ENV: &str = "ARMOR_PREFLIGHT_LOG";

/// Initialize stderr logging.
///
/// Defaults to `warn` so a normal run prints nothing beyond the check's own
/// output. Calling this more than once is a no-op.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
