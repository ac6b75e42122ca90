//! Diagnostic logging setup using tracing.
//!
//! Diagnostics are written to standard error so that command output on
//! standard output stays clean. `RUST_LOG` takes precedence over the level
//! given on the command line.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

/// Level used when none is given.
pub const DEFAULT_LOG_LEVEL: Level = Level::WARN;

/// Initializes the global tracing subscriber.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidLogLevel`] if `level` is not a known level.
pub fn init_logging(level: Option<&str>) -> Result<(), ConfigError> {
    let level = level.map_or(Ok(DEFAULT_LOG_LEVEL), parse_log_level)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("manwe={level}")));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // A second initialization in the same process is ignored.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();

    tracing::debug!(%level, "Logging initialized");
    Ok(())
}

fn parse_log_level(level: &str) -> Result<Level, ConfigError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ConfigError::InvalidLogLevel {
            level: level.to_string(),
        }),
    }
}
