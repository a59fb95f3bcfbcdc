//! UniFlow Tasks Domain Layer
//!
//! Core business entities and rules for academic task tracking:
//!
//! - [`task::Task`]: the task aggregate and its invariants
//! - [`query`]: filter descriptor plus the predicate, ordering and
//!   pagination rules every storage backend must follow
//! - [`dashboard`]: per-user aggregate counters and windows
//! - [`reminder`]: deadline reminder scheduling
//! - [`repositories::TaskRepository`]: the storage port
//!
//! This crate performs no I/O.

pub mod dashboard;
pub mod errors;
pub mod query;
pub mod reminder;
pub mod repositories;
pub mod task;
pub mod time;
pub mod user;
pub mod value_objects;

pub use dashboard::{DashboardAggregator, DashboardData};
pub use errors::{DomainError, DomainResult};
pub use query::{FilterSpec, Page, PageInfo, Pagination, QueryPlan, SortField, SortOrder};
pub use reminder::{ReminderPayload, ReminderPolicy, ReminderRecipient, ScheduledReminder};
pub use repositories::TaskRepository;
pub use task::{Task, TaskDetails};
pub use time::{Clock, FixedClock, SystemClock};
pub use user::UserContext;
pub use value_objects::{TaskId, TaskPriority, TaskStatus, TaskType, UserId};
