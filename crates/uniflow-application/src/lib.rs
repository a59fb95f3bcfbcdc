//! UniFlow Tasks Application Layer
//!
//! Implements the task use cases by orchestrating the domain aggregate, the
//! shared query engine, the dashboard aggregator and the reminder scheduler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Application Layer                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Services          │ DTOs              │ Ports              │ Context   │
//! │  ─────────         │ ────              │ ─────              │ ───────   │
//! │  TaskService       │ TaskInput         │ ReminderQueue      │ Request-  │
//! │                    │ TaskFilterQuery   │                    │ Context   │
//! │                    │ TaskDto, PageDto  │                    │           │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ depends on
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Layer                                     │
//! │  Task aggregate, FilterSpec, QueryPlan, TaskRepository trait            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Responsibilities
//!
//! - **Use Case Orchestration**: load, mutate and persist tasks
//! - **Request Scoping**: cancellation and deadlines around storage calls
//! - **DTO Mapping**: wire shapes in and out
//! - **Error Mapping**: domain errors to application errors
//!
//! # Non-Goals
//!
//! - Domain logic (belongs in the domain crate)
//! - Storage (belongs in the persistence crate)
//! - HTTP handling

pub mod context;
pub mod dto;
pub mod errors;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use context::RequestContext;
pub use dto::*;
pub use errors::{ApplicationError, ApplicationResult};
pub use ports::{InMemoryReminderQueue, QueueError, QueuedMessage, ReminderQueue};
pub use services::*;
