//! UniFlow Persistence Layer
//!
//! Infrastructure layer providing [`TaskRepository`](uniflow_domain::repositories::TaskRepository)
//! implementations.
//!
//! ## Features
//!
//! - **In-Memory Repository**: linear scan over a locked map, default backend
//! - **SurrealDB Repository**: document store, enabled by `surrealdb-backend`
//!
//! Both evaluate the same domain query plan and must return identical pages
//! for identical data.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  memory/                  │  surreal/                     │
//! │  InMemoryTaskRepository   │  SurrealTaskRepository        │
//! │  (QueryPlan::matches)     │  (query::translate)           │
//! └──────────────────────────────────────────────────────────┘
//!                            ▲ implements
//! ┌──────────────────────────────────────────────────────────┐
//! │  Domain Layer: TaskRepository, QueryPlan                  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod bootstrap;
pub mod error;
pub mod memory;

// SurrealDB backend for production persistence
#[cfg(feature = "surrealdb-backend")]
pub mod surreal;

pub use bootstrap::build_task_repository;
pub use error::PersistenceError;
pub use memory::InMemoryTaskRepository;

#[cfg(feature = "surrealdb-backend")]
pub use surreal::{
    create_shared_connection, ConnectionError, ConnectionMode, SharedConnection, SurrealConnection,
    SurrealTaskRepository,
};
