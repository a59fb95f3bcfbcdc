//! In-Memory Task Repository Implementation
//!
//! Scan adapter for the shared query engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use uniflow_domain::{
    errors::DomainResult,
    query::{FilterSpec, Page, QueryPlan},
    repositories::TaskRepository,
    task::Task,
    value_objects::{TaskId, TaskStatus, UserId},
};

use crate::error::PersistenceError;

/// Thread-safe in-memory implementation of TaskRepository
///
/// Uses RwLock for concurrent read access with exclusive write access.
/// Tasks are cloned across the lock boundary and the guard is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl InMemoryTaskRepository {
    /// Create a new empty in-memory task repository
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Create with initial tasks (useful for testing)
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let map = tasks.into_iter().map(|t| (t.id().clone(), t)).collect();
        Self {
            tasks: RwLock::new(map),
        }
    }

    /// Get the current count of tasks across all users
    pub fn count(&self) -> usize {
        self.tasks.read().len()
    }

    /// Clear all tasks
    pub fn clear(&self) {
        self.tasks.write().clear();
    }

    fn owned_by(&self, user_id: &UserId, keep: impl Fn(&Task) -> bool) -> Vec<Task> {
        let tasks = self.tasks.read();
        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|t| t.user_id() == user_id && keep(t))
            .cloned()
            .collect();
        drop(tasks);
        owned.sort_by(|a, b| a.due_date().cmp(&b.due_date()).then_with(|| a.id().cmp(b.id())));
        owned
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> DomainResult<()> {
        let mut tasks = self.tasks.write();
        if tasks.contains_key(task.id()) {
            return Err(PersistenceError::already_exists("Task", task.id().as_str()).into());
        }
        tasks.insert(task.id().clone(), task.clone());
        debug!(task_id = %task.id(), "stored task in memory");
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId, user_id: &UserId) -> DomainResult<Option<Task>> {
        let tasks = self.tasks.read();
        Ok(tasks.get(id).filter(|t| t.user_id() == user_id).cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> DomainResult<Vec<Task>> {
        Ok(self.owned_by(user_id, |_| true))
    }

    async fn find_by_status(&self, user_id: &UserId, status: TaskStatus) -> DomainResult<Vec<Task>> {
        Ok(self.owned_by(user_id, |t| t.status() == status))
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        let mut tasks = self.tasks.write();
        match tasks.get_mut(task.id()) {
            Some(stored) if stored.user_id() == task.user_id() => {
                stored.ensure_can_be_modified()?;
                *stored = task.clone();
                Ok(())
            }
            _ => Err(PersistenceError::not_found("Task", task.id().as_str()).into()),
        }
    }

    async fn delete(&self, id: &TaskId, user_id: &UserId) -> DomainResult<()> {
        let mut tasks = self.tasks.write();
        match tasks.get(id) {
            Some(stored) if stored.user_id() == user_id => stored.ensure_can_be_deleted()?,
            _ => return Err(PersistenceError::not_found("Task", id.as_str()).into()),
        }
        tasks.remove(id);
        Ok(())
    }

    async fn find(&self, spec: &FilterSpec, now: DateTime<Utc>) -> DomainResult<Page<Task>> {
        let plan = QueryPlan::new(spec, now);
        let matched: Vec<Task> = {
            let tasks = self.tasks.read();
            tasks.values().filter(|t| plan.matches(t)).cloned().collect()
        };
        let page = plan.execute(matched);
        debug!(
            user_id = %spec.user_id,
            total = page.info.total,
            returned = page.items.len(),
            "scanned in-memory tasks"
        );
        Ok(page)
    }
}
