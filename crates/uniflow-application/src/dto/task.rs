//! Task-related DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use uniflow_domain::dashboard::DashboardData;
use uniflow_domain::query::{Page, PageInfo};
use uniflow_domain::task::{Task, TaskDetails};
use uniflow_domain::value_objects::{TaskPriority, TaskStatus, TaskType};

use crate::errors::ApplicationResult;

/// Editable task fields as sent by clients
///
/// Used both to create a task and to replace the details of an existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub subject_id: String,
    #[serde(default)]
    pub period_id: String,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(rename = "type", default = "default_task_type")]
    pub task_type: String,
    #[serde(default)]
    pub estimated_time_hours: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_group_work: bool,
    #[serde(default)]
    pub group_members: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

fn default_priority() -> String {
    TaskPriority::Medium.as_str().to_string()
}

fn default_task_type() -> String {
    TaskType::Assignment.as_str().to_string()
}

impl TaskInput {
    /// Parse enum fields and build the domain value
    pub fn into_details(self) -> ApplicationResult<TaskDetails> {
        let priority: TaskPriority = self.priority.parse()?;
        let task_type: TaskType = self.task_type.parse()?;

        Ok(TaskDetails {
            title: self.title.trim().to_string(),
            description: self.description,
            subject_id: self.subject_id.trim().to_string(),
            period_id: self.period_id.trim().to_string(),
            due_date: self.due_date,
            priority,
            task_type,
            estimated_hours: self.estimated_time_hours,
            tags: self.tags,
            is_group_work: self.is_group_work,
            group_members: self.group_members,
            attachments: self.attachments,
        })
    }
}

/// Command to create a new task
pub type CreateTaskCommand = TaskInput;

/// Command to replace a task's editable fields
pub type UpdateTaskCommand = TaskInput;

/// Command to move a task to another status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusCommand {
    pub status: String,
}

impl ChangeStatusCommand {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    pub fn parse(&self) -> ApplicationResult<TaskStatus> {
        Ok(self.status.parse()?)
    }
}

/// Command to mark a task done
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskCommand {
    #[serde(default)]
    pub actual_time_hours: Option<f64>,
}

/// Task as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub subject_id: String,
    pub period_id: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub estimated_time_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_time_hours: Option<f64>,
    pub tags: Vec<String>,
    pub is_group_work: bool,
    pub group_members: Vec<String>,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskDto {
    /// Create from domain aggregate
    pub fn from_domain(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            user_id: task.user_id().to_string(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            subject_id: task.subject_id().to_string(),
            period_id: task.period_id().to_string(),
            due_date: task.due_date(),
            status: task.status(),
            priority: task.priority(),
            task_type: task.task_type(),
            estimated_time_hours: task.estimated_hours(),
            actual_time_hours: task.actual_hours(),
            tags: task.tags().to_vec(),
            is_group_work: task.is_group_work(),
            group_members: task.group_members().to_vec(),
            attachments: task.attachments().to_vec(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            completed_at: task.completed_at(),
        }
    }
}

/// One page of tasks plus its pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPageDto {
    pub tasks: Vec<TaskDto>,
    pub pagination: PageInfo,
}

impl TaskPageDto {
    pub fn from_domain(page: Page<Task>) -> Self {
        let page = page.map(|task| TaskDto::from_domain(&task));
        Self {
            tasks: page.items,
            pagination: page.info,
        }
    }

    /// Task ids in page order
    pub fn ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }
}

/// Dashboard as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub upcoming_tasks: Vec<TaskDto>,
    pub today_tasks: Vec<TaskDto>,
    pub overdue_count: u64,
    pub total_pending: u64,
    pub completed_this_week: u64,
    pub in_progress_count: u64,
    pub todo_count: u64,
}

impl DashboardDto {
    pub fn from_domain(data: &DashboardData) -> Self {
        Self {
            upcoming_tasks: data.upcoming_tasks.iter().map(TaskDto::from_domain).collect(),
            today_tasks: data.today_tasks.iter().map(TaskDto::from_domain).collect(),
            overdue_count: data.overdue_count,
            total_pending: data.total_pending,
            completed_this_week: data.completed_this_week,
            in_progress_count: data.in_progress_count,
            todo_count: data.todo_count,
        }
    }
}

/// Liveness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn healthy(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "healthy".to_string(),
            service: "tasks".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
        }
    }
}
