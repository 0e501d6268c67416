//! Process-wide tracing and logging setup.

pub mod tracing;

pub use tracing::LogFormat;

/// Initialize process-wide observability (tracing/logging).
///
/// Reads `RUST_LOG` and `LOG_FORMAT`. Subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
