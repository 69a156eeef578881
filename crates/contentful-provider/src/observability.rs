//! Log subscriber for the provider and its command line.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber filtered at `level`, unless `RUST_LOG`
/// carries its own directives. Logs go to stderr so state written to stdout
/// stays machine readable. A second call keeps the first subscriber.
pub fn init_tracing_with_level(level: &str) {
    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref(), level);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn log_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}
