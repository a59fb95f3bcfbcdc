//! SurrealDB Connection Management
//!
//! Supports embedded (in-memory) and client-server modes.
//!
//! ## Modes
//!
//! - **Embedded (Memory)**: `kv-mem` - in-process, no persistence (development/tests)
//! - **Client (WebSocket)**: `protocol-ws` - remote server connection (production)
//!
//! ## Usage
//!
//! ```ignore
//! use uniflow_persistence::surreal::{SurrealConnection, ConnectionMode};
//!
//! let conn = SurrealConnection::new(ConnectionMode::Memory).await?;
//!
//! let conn = SurrealConnection::with_names(ConnectionMode::Remote {
//!     url: "ws://localhost:8000".into(),
//!     username: "root".into(),
//!     password: "secret".into(),
//! }, "uniflow", "tasks").await?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use surrealdb::engine::local::{Db as LocalDb, Mem};
use surrealdb::engine::remote::ws::{Client as WsClient, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Named query parameters (`$name` in SurrealQL)
pub type Bindings = BTreeMap<String, serde_json::Value>;

/// Connection mode for SurrealDB
#[derive(Debug, Clone, Default)]
pub enum ConnectionMode {
    /// In-memory database (no persistence)
    #[default]
    Memory,
    /// Remote server connection via WebSocket
    Remote {
        url: String,
        username: String,
        password: String,
    },
}

/// SurrealDB connection errors
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to SurrealDB: {0}")]
    Connection(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Database selection failed: {0}")]
    DatabaseSelection(String),
}

impl From<ConnectionError> for PersistenceError {
    fn from(err: ConnectionError) -> Self {
        PersistenceError::Connection(err.to_string())
    }
}

/// Unified database client that works with both embedded and remote modes
pub enum DatabaseClient {
    /// Embedded local database
    Local(Surreal<LocalDb>),
    /// Remote WebSocket client
    Remote(Surreal<WsClient>),
}

impl DatabaseClient {
    /// Run SurrealQL with bound parameters on whichever engine is active
    pub async fn execute(&self, sql: String, bindings: Bindings) -> Result<Response, surrealdb::Error> {
        match self {
            Self::Local(db) => db.query(sql).bind(bindings).await,
            Self::Remote(db) => db.query(sql).bind(bindings).await,
        }
    }
}

/// SurrealDB connection wrapper
///
/// Manages connection lifecycle and provides unified access to database operations.
pub struct SurrealConnection {
    client: DatabaseClient,
    mode: ConnectionMode,
    namespace: String,
    database: String,
}

impl SurrealConnection {
    /// Create a new SurrealDB connection with the specified mode
    ///
    /// Default namespace: "uniflow"
    /// Default database: "tasks"
    pub async fn new(mode: ConnectionMode) -> Result<Self, ConnectionError> {
        Self::with_names(mode, "uniflow", "tasks").await
    }

    /// Create a new SurrealDB connection with custom namespace and database
    pub async fn with_names(
        mode: ConnectionMode,
        namespace: &str,
        database: &str,
    ) -> Result<Self, ConnectionError> {
        let client = match &mode {
            ConnectionMode::Memory => {
                info!("Connecting to SurrealDB in-memory mode");
                let db = Surreal::new::<Mem>(())
                    .await
                    .map_err(|e| ConnectionError::Connection(e.to_string()))?;
                db.use_ns(namespace)
                    .use_db(database)
                    .await
                    .map_err(|e| ConnectionError::DatabaseSelection(e.to_string()))?;
                DatabaseClient::Local(db)
            }

            ConnectionMode::Remote { url, username, password } => {
                info!(url = %url, "Connecting to SurrealDB remote");
                let db = Surreal::new::<Ws>(url.as_str())
                    .await
                    .map_err(|e| ConnectionError::Connection(e.to_string()))?;

                db.signin(Root {
                    username: username.as_str(),
                    password: password.as_str(),
                })
                .await
                .map_err(|e| ConnectionError::Authentication(e.to_string()))?;

                db.use_ns(namespace)
                    .use_db(database)
                    .await
                    .map_err(|e| ConnectionError::DatabaseSelection(e.to_string()))?;
                DatabaseClient::Remote(db)
            }
        };

        debug!(namespace, database, "Connected to SurrealDB");

        Ok(Self {
            client,
            mode,
            namespace: namespace.to_string(),
            database: database.to_string(),
        })
    }

    /// Get the connection mode
    pub fn mode(&self) -> &ConnectionMode {
        &self.mode
    }

    /// Get the namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the database
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Get the underlying database client
    pub fn client(&self) -> &DatabaseClient {
        &self.client
    }

    /// Check if connected in embedded mode
    pub fn is_embedded(&self) -> bool {
        matches!(self.mode, ConnectionMode::Memory)
    }
}

/// Connection shared across repositories
pub type SharedConnection = Arc<SurrealConnection>;

/// Create a shared connection
pub async fn create_shared_connection(
    mode: ConnectionMode,
    namespace: &str,
    database: &str,
) -> Result<SharedConnection, ConnectionError> {
    Ok(Arc::new(SurrealConnection::with_names(mode, namespace, database).await?))
}
