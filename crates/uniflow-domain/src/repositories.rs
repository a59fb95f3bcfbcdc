//! Repository interfaces for task persistence
//!
//! Every operation is scoped by the owning user. A task id that exists under
//! another user behaves exactly like a missing id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainResult;
use crate::query::{FilterSpec, Page};
use crate::task::Task;
use crate::value_objects::{TaskId, TaskStatus, UserId};

/// Storage for task aggregates
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task
    async fn create(&self, task: &Task) -> DomainResult<()>;

    /// Fetch a task owned by `user_id`
    async fn find_by_id(&self, id: &TaskId, user_id: &UserId) -> DomainResult<Option<Task>>;

    /// All of a user's tasks, ascending by due date
    async fn find_by_user(&self, user_id: &UserId) -> DomainResult<Vec<Task>>;

    /// A user's tasks in one status, ascending by due date
    async fn find_by_status(&self, user_id: &UserId, status: TaskStatus) -> DomainResult<Vec<Task>>;

    /// Replace the stored task matching `(task.id, task.user_id)`
    ///
    /// The stored copy must still accept changes at the moment of the write.
    /// Returns `EntityNotFound` when nothing matched and
    /// `BusinessRuleViolation` when the stored task is done or cancelled.
    async fn update(&self, task: &Task) -> DomainResult<()>;

    /// Delete the task matching `(id, user_id)`
    ///
    /// Returns `EntityNotFound` when nothing matched and
    /// `BusinessRuleViolation` when the stored task is done.
    async fn delete(&self, id: &TaskId, user_id: &UserId) -> DomainResult<()>;

    /// Filtered, ordered, paginated listing evaluated at `now`
    async fn find(&self, spec: &FilterSpec, now: DateTime<Utc>) -> DomainResult<Page<Task>>;
}
