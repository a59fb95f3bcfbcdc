//! UniFlow Configuration Management
//!
//! Loads [`AppConfig`] from an optional TOML file overlaid with `UNIFLOW__*`
//! environment variables, validates it, and sets up tracing.

pub mod error;
pub mod logging;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use logging::init_tracing;
pub use manager::ConfigManager;
pub use types::{
    AppConfig, LoggingConfig, QueryConfig, ReminderConfig, StorageBackend, StorageConfig,
    SurrealConfig, SurrealMode, TimeoutConfig,
};
