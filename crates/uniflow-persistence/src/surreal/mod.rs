//! SurrealDB Repository Implementations
//!
//! Document-store backend. Filtered listings are translated to SurrealQL
//! from the same [`QueryPlan`](uniflow_domain::query::QueryPlan) the
//! in-memory backend evaluates.
//!
//! ## Usage
//!
//! ```ignore
//! use uniflow_persistence::surreal::{create_shared_connection, ConnectionMode, SurrealTaskRepository};
//!
//! let conn = create_shared_connection(ConnectionMode::Memory, "uniflow", "tasks").await?;
//! let repo = SurrealTaskRepository::new(conn);
//! repo.ensure_schema().await?;
//! ```

pub mod connection;
pub mod query;
pub mod task_repository;

pub use connection::{
    create_shared_connection, Bindings, ConnectionError, ConnectionMode, DatabaseClient,
    SharedConnection, SurrealConnection,
};
pub use query::{translate, SurrealQuery, TABLE_NAME};
pub use task_repository::SurrealTaskRepository;
