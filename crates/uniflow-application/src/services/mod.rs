//! Application layer services
//!
//! Services orchestrate the task aggregate and implement use cases. They
//! hold no per-request state and take their collaborators by constructor
//! injection.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Services                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TaskService - task lifecycle, listings, dashboard, reminders│
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod task_service;

pub use task_service::{TaskService, TaskServiceOptions, FIXED_LISTING_LIMIT};
