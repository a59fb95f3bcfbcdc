//! Shared fixtures for the cross-crate integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use uniflow_domain::repositories::TaskRepository;
use uniflow_domain::task::{Task, TaskDetails};
use uniflow_domain::value_objects::{TaskId, TaskPriority, TaskStatus, TaskType, UserId};
use uniflow_persistence::{
    create_shared_connection, ConnectionMode, InMemoryTaskRepository, SurrealTaskRepository,
};

/// Fixed reference instant shared by every scenario
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 14, 15, 30, 0).unwrap()
}

/// Both backends, freshly created and empty
pub async fn backends() -> Vec<(&'static str, Arc<dyn TaskRepository>)> {
    let connection = create_shared_connection(ConnectionMode::Memory, "uniflow_test", "tasks")
        .await
        .expect("in-memory SurrealDB should start");
    let surreal = SurrealTaskRepository::new(connection);
    surreal.ensure_schema().await.expect("schema should apply");

    vec![
        ("memory", Arc::new(InMemoryTaskRepository::new()) as Arc<dyn TaskRepository>),
        ("surreal", Arc::new(surreal) as Arc<dyn TaskRepository>),
    ]
}

/// Builder for tasks with explicit ids and timestamps
#[derive(Debug, Clone)]
pub struct TaskFixture {
    id: String,
    user: String,
    title: String,
    description: String,
    subject: String,
    period: String,
    due: DateTime<Utc>,
    status: TaskStatus,
    priority: TaskPriority,
    task_type: TaskType,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    completed: Option<DateTime<Utc>>,
}

impl TaskFixture {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            user: "u-1".to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            subject: "math-101".to_string(),
            period: "2025-2".to_string(),
            due: now() + Duration::days(1),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            task_type: TaskType::Assignment,
            created: now() - Duration::days(10),
            updated: now() - Duration::days(10),
            completed: None,
        }
    }

    pub fn user(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn period(mut self, period: &str) -> Self {
        self.period = period.to_string();
        self
    }

    pub fn due(mut self, due: DateTime<Utc>) -> Self {
        self.due = due;
        self
    }

    pub fn due_in_hours(self, hours: i64) -> Self {
        self.due(now() + Duration::hours(hours))
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self.completed = (status == TaskStatus::Done).then(|| now() - Duration::days(1));
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed = Some(at);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created = at;
        self.updated = at;
        self
    }

    pub fn build(self) -> Task {
        let details = TaskDetails {
            title: self.title,
            description: self.description,
            subject_id: self.subject,
            period_id: self.period,
            due_date: self.due,
            priority: self.priority,
            task_type: self.task_type,
            estimated_hours: 2.0,
            tags: vec!["coursework".to_string()],
            is_group_work: self.task_type == TaskType::GroupWork,
            group_members: Vec::new(),
            attachments: Vec::new(),
        };
        Task::reconstitute(
            TaskId::from_string(self.id),
            UserId::new(self.user),
            details,
            self.status,
            None,
            self.created,
            self.updated,
            self.completed,
        )
    }
}

/// Insert `tasks` into `repo`
pub async fn seed(repo: &dyn TaskRepository, tasks: &[Task]) {
    for task in tasks {
        repo.create(task).await.expect("seed insert should succeed");
    }
}

/// Ids of a result list, in order
pub fn ids(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id().to_string()).collect()
}
