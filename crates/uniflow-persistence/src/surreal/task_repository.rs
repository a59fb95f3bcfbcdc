//! SurrealDB Task Repository Implementation
//!
//! Query-translation adapter for the shared query engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use uniflow_domain::{
    errors::{DomainError, DomainResult},
    query::{FilterSpec, Page, PageInfo, QueryPlan},
    repositories::TaskRepository,
    task::{Task, TaskDetails},
    value_objects::{TaskId, TaskStatus, UserId},
};

use super::connection::{Bindings, SharedConnection};
use super::query::{to_micros, translate, TABLE_NAME};
use crate::error::PersistenceError;

/// Stored task document
///
/// The record id duplicates `task_id`; it is never read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskRecord {
    task_id: String,
    user_id: String,
    title: String,
    description: String,
    subject_id: String,
    period_id: String,
    due_at: i64,
    status: String,
    status_rank: i64,
    priority: String,
    priority_rank: i64,
    task_type: String,
    estimated_hours: f64,
    #[serde(default)]
    actual_hours: Option<f64>,
    tags: Vec<String>,
    is_group_work: bool,
    group_members: Vec<String>,
    attachments: Vec<String>,
    created_at: i64,
    updated_at: i64,
    #[serde(default)]
    completed_at: Option<i64>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id().to_string(),
            user_id: task.user_id().to_string(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            subject_id: task.subject_id().to_string(),
            period_id: task.period_id().to_string(),
            due_at: to_micros(task.due_date()),
            status: task.status().as_str().to_string(),
            status_rank: task.status().rank() as i64,
            priority: task.priority().as_str().to_string(),
            priority_rank: task.priority().rank() as i64,
            task_type: task.task_type().as_str().to_string(),
            estimated_hours: task.estimated_hours(),
            actual_hours: task.actual_hours(),
            tags: task.tags().to_vec(),
            is_group_work: task.is_group_work(),
            group_members: task.group_members().to_vec(),
            attachments: task.attachments().to_vec(),
            created_at: to_micros(task.created_at()),
            updated_at: to_micros(task.updated_at()),
            completed_at: task.completed_at().map(to_micros),
        }
    }
}

fn from_micros(field: &str, micros: i64) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        PersistenceError::Deserialization(format!("{} out of range: {}", field, micros))
    })
}

impl TryFrom<TaskRecord> for Task {
    type Error = PersistenceError;

    fn try_from(r: TaskRecord) -> Result<Self, Self::Error> {
        let corrupt = |e: DomainError| PersistenceError::Deserialization(e.to_string());

        let details = TaskDetails {
            title: r.title,
            description: r.description,
            subject_id: r.subject_id,
            period_id: r.period_id,
            due_date: from_micros("due_at", r.due_at)?,
            priority: r.priority.parse().map_err(corrupt)?,
            task_type: r.task_type.parse().map_err(corrupt)?,
            estimated_hours: r.estimated_hours,
            tags: r.tags,
            is_group_work: r.is_group_work,
            group_members: r.group_members,
            attachments: r.attachments,
        };
        let completed_at = r
            .completed_at
            .map(|micros| from_micros("completed_at", micros))
            .transpose()?;

        let task = Task::reconstitute(
            TaskId::from_string(r.task_id),
            UserId::new(r.user_id),
            details,
            r.status.parse::<TaskStatus>().map_err(corrupt)?,
            r.actual_hours,
            from_micros("created_at", r.created_at)?,
            from_micros("updated_at", r.updated_at)?,
            completed_at,
        );
        task.validate().map_err(corrupt)?;
        Ok(task)
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct MatchedRow {
    #[allow(dead_code)]
    task_id: String,
}

/// Helper to convert SurrealDB errors to domain errors
fn to_domain_error(e: surrealdb::Error) -> DomainError {
    PersistenceError::Database(e.to_string()).into()
}

fn into_tasks(records: Vec<TaskRecord>) -> DomainResult<Vec<Task>> {
    records
        .into_iter()
        .map(|r| Task::try_from(r).map_err(DomainError::from))
        .collect()
}

/// SurrealDB implementation of TaskRepository
pub struct SurrealTaskRepository {
    connection: SharedConnection,
}

impl SurrealTaskRepository {
    /// Create a new SurrealDB task repository
    pub fn new(connection: SharedConnection) -> Self {
        Self { connection }
    }

    /// Define the table and its lookup indexes
    pub async fn ensure_schema(&self) -> DomainResult<()> {
        let sql = format!(
            "DEFINE TABLE IF NOT EXISTS {t} SCHEMALESS;\n\
             DEFINE INDEX IF NOT EXISTS {t}_user ON TABLE {t} COLUMNS user_id;\n\
             DEFINE INDEX IF NOT EXISTS {t}_user_due ON TABLE {t} COLUMNS user_id, due_at;",
            t = TABLE_NAME
        );
        self.connection
            .client()
            .execute(sql, Bindings::new())
            .await
            .and_then(|response| response.check())
            .map_err(to_domain_error)?;
        Ok(())
    }

    async fn select(&self, sql: String, bindings: Bindings) -> DomainResult<Vec<Task>> {
        let mut response = self
            .connection
            .client()
            .execute(sql, bindings)
            .await
            .map_err(to_domain_error)?;
        let records: Vec<TaskRecord> = response.take(0).map_err(to_domain_error)?;
        into_tasks(records)
    }

    /// Why a guarded write matched nothing: missing, or refused by the stored state
    async fn explain_miss(
        &self,
        id: &TaskId,
        user_id: &UserId,
        guard: fn(&Task) -> DomainResult<()>,
    ) -> DomainError {
        match self.find_by_id(id, user_id).await {
            Ok(Some(stored)) => match guard(&stored) {
                Err(refused) => refused,
                Ok(()) => DomainError::rule(format!("task {} changed during the write", id)),
            },
            Ok(None) => PersistenceError::not_found("Task", id.as_str()).into(),
            Err(e) => e,
        }
    }

    fn owner_bindings(id: &TaskId, user_id: &UserId) -> Bindings {
        let mut bindings = Bindings::new();
        bindings.insert("id".into(), json!(id.as_str()));
        bindings.insert("user_id".into(), json!(user_id.as_str()));
        bindings
    }
}

#[async_trait]
impl TaskRepository for SurrealTaskRepository {
    async fn create(&self, task: &Task) -> DomainResult<()> {
        debug!(task_id = %task.id(), "Creating task in SurrealDB");

        let content = serde_json::to_value(TaskRecord::from(task))
            .map_err(|e| DomainError::from(PersistenceError::Serialization(e.to_string())))?;
        let mut bindings = Bindings::new();
        bindings.insert("id".into(), json!(task.id().as_str()));
        bindings.insert("content".into(), content);

        let sql = format!(
            "CREATE type::thing('{}', $id) CONTENT $content RETURN NONE;",
            TABLE_NAME
        );
        self.connection
            .client()
            .execute(sql, bindings)
            .await
            .and_then(|response| response.check())
            .map_err(|e| {
                if e.to_string().contains("already exists") {
                    PersistenceError::already_exists("Task", task.id().as_str()).into()
                } else {
                    to_domain_error(e)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId, user_id: &UserId) -> DomainResult<Option<Task>> {
        debug!(task_id = %id, "Finding task by id");
        let sql = format!(
            "SELECT * OMIT id FROM type::thing('{}', $id) WHERE user_id = $user_id;",
            TABLE_NAME
        );
        let mut tasks = self.select(sql, Self::owner_bindings(id, user_id)).await?;
        Ok(tasks.pop())
    }

    async fn find_by_user(&self, user_id: &UserId) -> DomainResult<Vec<Task>> {
        debug!(user_id = %user_id, "Finding tasks for user");
        let sql = format!(
            "SELECT * OMIT id FROM {} WHERE user_id = $user_id ORDER BY due_at ASC, task_id ASC;",
            TABLE_NAME
        );
        let mut bindings = Bindings::new();
        bindings.insert("user_id".into(), json!(user_id.as_str()));
        self.select(sql, bindings).await
    }

    async fn find_by_status(&self, user_id: &UserId, status: TaskStatus) -> DomainResult<Vec<Task>> {
        debug!(user_id = %user_id, status = %status, "Finding tasks by status");
        let sql = format!(
            "SELECT * OMIT id FROM {} WHERE user_id = $user_id AND status = $status \
             ORDER BY due_at ASC, task_id ASC;",
            TABLE_NAME
        );
        let mut bindings = Bindings::new();
        bindings.insert("user_id".into(), json!(user_id.as_str()));
        bindings.insert("status".into(), json!(status.as_str()));
        self.select(sql, bindings).await
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        debug!(task_id = %task.id(), "Updating task in SurrealDB");

        let content = serde_json::to_value(TaskRecord::from(task))
            .map_err(|e| DomainError::from(PersistenceError::Serialization(e.to_string())))?;
        let mut bindings = Self::owner_bindings(task.id(), task.user_id());
        bindings.insert("content".into(), content);
        bindings.insert("done".into(), json!(TaskStatus::Done.as_str()));
        bindings.insert("cancelled".into(), json!(TaskStatus::Cancelled.as_str()));

        // the status guard is evaluated against the stored document
        let sql = format!(
            "UPDATE type::thing('{}', $id) CONTENT $content \
             WHERE user_id = $user_id AND status != $done AND status != $cancelled RETURN AFTER;",
            TABLE_NAME
        );
        let mut response = self
            .connection
            .client()
            .execute(sql, bindings)
            .await
            .map_err(to_domain_error)?;
        let matched: Vec<MatchedRow> = response.take(0).map_err(to_domain_error)?;
        if matched.is_empty() {
            return Err(self
                .explain_miss(task.id(), task.user_id(), Task::ensure_can_be_modified)
                .await);
        }
        Ok(())
    }

    async fn delete(&self, id: &TaskId, user_id: &UserId) -> DomainResult<()> {
        debug!(task_id = %id, "Deleting task from SurrealDB");

        let mut bindings = Self::owner_bindings(id, user_id);
        bindings.insert("done".into(), json!(TaskStatus::Done.as_str()));

        let sql = format!(
            "DELETE type::thing('{}', $id) WHERE user_id = $user_id AND status != $done RETURN BEFORE;",
            TABLE_NAME
        );
        let mut response = self
            .connection
            .client()
            .execute(sql, bindings)
            .await
            .map_err(to_domain_error)?;
        let matched: Vec<MatchedRow> = response.take(0).map_err(to_domain_error)?;
        if matched.is_empty() {
            return Err(self
                .explain_miss(id, user_id, Task::ensure_can_be_deleted)
                .await);
        }
        Ok(())
    }

    async fn find(&self, spec: &FilterSpec, now: DateTime<Utc>) -> DomainResult<Page<Task>> {
        let plan = QueryPlan::new(spec, now);
        let query = translate(&plan);
        debug!(user_id = %spec.user_id, sql = %query.sql, "Running filtered task query");

        let mut response = self
            .connection
            .client()
            .execute(query.sql, query.bindings)
            .await
            .map_err(to_domain_error)?;

        // count and page may observe different snapshots under concurrent writes
        let count: Option<CountRow> = response.take(0).map_err(to_domain_error)?;
        let records: Vec<TaskRecord> = response.take(1).map_err(to_domain_error)?;

        let total = count.map_or(0, |row| row.total);
        Ok(Page::new(into_tasks(records)?, PageInfo::new(total, spec.pagination)))
    }
}
