// Logging init: tracing subscriber to stderr, opt-in for embedders

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber with a sensible default filter.
/// Library code only emits `tracing` events; binaries and tests call
/// this (or bring their own subscriber). Calling it twice is harmless.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,vidgrab=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
