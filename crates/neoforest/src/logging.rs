//! Logging setup for the command-line tool.
//!
//! The library logs through the `log` facade; this installs a `tracing-subscriber`
//! formatter that also receives those records.

use crate::error::{ExportError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter for a verbosity count: 0 → info, 1 → debug, 2+ → trace.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when set.
///
/// # Errors
///
/// Returns [`ExportError::Config`] if the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .map_err(|e| ExportError::config(format!("Invalid log level: {e}")))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| ExportError::config("Logging already initialized"))
}
