//! Log subscriber setup for test binaries.
//!
//! The engine only emits `tracing` events. Test suites that want to see
//! them call [`init_logging`] once; the filter comes from `SETTLE_LOG`
//! (e.g. `SETTLE_LOG=settle=debug`) and defaults to `warn`.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive
pub const LOG_ENV: &str = "SETTLE_LOG";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, compact lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Filter from `SETTLE_LOG`, or `default_directive` when unset or invalid
#[must_use]
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install a global subscriber.
///
/// Returns `false` if one was already installed, so every test may call it.
pub fn init_logging(format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_test_writer()
        .with_target(true);
    match format {
        LogFormat::Pretty => builder.compact().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}
