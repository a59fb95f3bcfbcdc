//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};
use crate::types::LoggingConfig;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set. Fails if a subscriber
/// is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Logging(format!("invalid log level '{}': {}", config.level, e)))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| ConfigError::Logging(e.to_string()))
}
