use tracing_subscriber::EnvFilter;

use crate::types::LogLevel;

/// Log to stderr at `level`, with RUST_LOG directives layered on top.
/// Stdout carries command output only.
pub fn init(level: LogLevel) {
    let level: tracing::Level = level.into();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}
