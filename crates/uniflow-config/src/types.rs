//! Core configuration types and data structures

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uniflow_domain::reminder::ReminderPolicy;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Task storage backend
    pub storage: StorageConfig,
    /// Deadline reminders
    pub reminders: ReminderConfig,
    /// Query defaults
    pub query: QueryConfig,
    /// Per-operation deadlines
    pub timeouts: TimeoutConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// Which repository implementation serves tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Surreal,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub surreal: SurrealConfig,
}

/// Where SurrealDB runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SurrealMode {
    /// Embedded, in-process
    #[default]
    Memory,
    /// WebSocket server
    Remote,
}

/// SurrealDB connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurrealConfig {
    pub mode: SurrealMode,
    /// Server address, required in remote mode
    pub url: Option<String>,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
}

impl Default for SurrealConfig {
    fn default() -> Self {
        Self {
            mode: SurrealMode::Memory,
            url: None,
            username: "root".to_string(),
            password: "root".to_string(),
            namespace: "uniflow".to_string(),
            database: "tasks".to_string(),
        }
    }
}

/// Deadline reminder configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReminderConfig {
    /// Enqueue reminders after task creation
    pub enabled: bool,
    /// Days before the due date the reminder becomes visible
    pub lead_days: u32,
    /// Queue's maximum visibility delay
    pub max_delay_secs: u64,
    /// Delay used when the reminder time already passed
    pub min_delay_secs: u64,
}

impl ReminderConfig {
    pub fn policy(&self) -> ReminderPolicy {
        ReminderPolicy {
            lead_days: self.lead_days,
            max_delay: Duration::from_secs(self.max_delay_secs),
            min_delay: Duration::from_secs(self.min_delay_secs),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        let policy = ReminderPolicy::default();
        Self {
            enabled: true,
            lead_days: policy.lead_days,
            max_delay_secs: policy.max_delay.as_secs(),
            min_delay_secs: policy.min_delay.as_secs(),
        }
    }
}

/// Query defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryConfig {
    /// IANA zone used when a request names none
    pub default_timezone: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_timezone: "UTC".to_string(),
        }
    }
}

/// Default deadlines for storage calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    pub read_secs: u64,
    pub write_secs: u64,
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 10,
            write_secs: 5,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `uniflow_persistence=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
