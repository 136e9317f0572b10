//! Tracing subscriber setup. `RUST_LOG` always wins over the configured level.

use tracing_subscriber::EnvFilter;

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Structured JSON lines on stdout, for the daemon.
pub fn init_json(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .json()
        .init();
}

/// Compact human output on stderr, for one-shot CLI commands. Stdout stays
/// free for the transcript and command output.
pub fn init_cli(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
