//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use tracing::debug;
use uniflow_domain::time::resolve_timezone;

use crate::{
    error::{ConfigError, Result},
    types::{AppConfig, SurrealMode},
};

/// Default environment prefix, e.g. `UNIFLOW__STORAGE__BACKEND=surreal`
pub const ENV_PREFIX: &str = "UNIFLOW";

/// Separator between prefix and nested keys
pub const ENV_SEPARATOR: &str = "__";

/// Configuration manager
///
/// Layers an optional TOML file under environment variables.
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Override the environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config").join("uniflow.toml")
    }

    /// Load and validate configuration
    ///
    /// A missing file is not an error; defaults fill every absent key.
    pub fn load(&self) -> Result<AppConfig> {
        debug!(path = %self.config_path.display(), prefix = %self.env_prefix, "loading configuration");

        let config = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        self.validate(&app_config)?;
        Ok(app_config)
    }

    /// Write configuration as TOML to the manager's path
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    /// Reject configurations the services cannot run with
    pub fn validate(&self, config: &AppConfig) -> Result<()> {
        resolve_timezone(&config.query.default_timezone)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        config
            .reminders
            .policy()
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if config.timeouts.read_secs == 0 || config.timeouts.write_secs == 0 {
            return Err(ConfigError::Validation(
                "timeouts must be greater than 0".to_string(),
            ));
        }

        let surreal = &config.storage.surreal;
        if surreal.mode == SurrealMode::Remote
            && surreal.url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "storage.surreal.url is required in remote mode".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
