//! Repository selection from configuration

use std::sync::Arc;

use tracing::info;
use uniflow_config::{StorageBackend, StorageConfig};
use uniflow_domain::repositories::TaskRepository;

use crate::error::PersistenceError;
use crate::memory::InMemoryTaskRepository;

/// Build the task repository the configuration asks for
///
/// # Errors
/// `Configuration` when SurrealDB is requested but the crate was built
/// without the `surrealdb-backend` feature; `Connection` when the database
/// cannot be reached.
pub async fn build_task_repository(
    config: &StorageConfig,
) -> Result<Arc<dyn TaskRepository>, PersistenceError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory task repository");
            Ok(Arc::new(InMemoryTaskRepository::new()))
        }
        StorageBackend::Surreal => build_surreal(config).await,
    }
}

#[cfg(feature = "surrealdb-backend")]
async fn build_surreal(config: &StorageConfig) -> Result<Arc<dyn TaskRepository>, PersistenceError> {
    use crate::surreal::{create_shared_connection, ConnectionMode, SurrealTaskRepository};
    use uniflow_config::SurrealMode;

    let surreal = &config.surreal;
    let mode = match surreal.mode {
        SurrealMode::Memory => ConnectionMode::Memory,
        SurrealMode::Remote => ConnectionMode::Remote {
            url: surreal.url.clone().ok_or_else(|| {
                PersistenceError::Configuration("storage.surreal.url is required in remote mode".into())
            })?,
            username: surreal.username.clone(),
            password: surreal.password.clone(),
        },
    };

    info!(namespace = %surreal.namespace, database = %surreal.database, "Using SurrealDB task repository");
    let connection = create_shared_connection(mode, &surreal.namespace, &surreal.database).await?;
    let repository = SurrealTaskRepository::new(connection);
    repository
        .ensure_schema()
        .await
        .map_err(|e| PersistenceError::Database(e.to_string()))?;
    Ok(Arc::new(repository))
}

#[cfg(not(feature = "surrealdb-backend"))]
async fn build_surreal(_config: &StorageConfig) -> Result<Arc<dyn TaskRepository>, PersistenceError> {
    Err(PersistenceError::Configuration(
        "SurrealDB storage requires the surrealdb-backend feature".into(),
    ))
}
