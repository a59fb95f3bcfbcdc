//! Task aggregate root
//!
//! A task is one academic activity owned by a single user. All mutations go
//! through methods that re-check the aggregate invariants:
//! - title, subject and owner are non-empty
//! - `completed_at` is present exactly when the status is `done`
//! - done and cancelled tasks cannot be modified
//! - done tasks cannot be deleted
//!
//! Every timestamp is truncated to microseconds on the way in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::time::normalize_instant;
use crate::value_objects::{TaskId, TaskPriority, TaskStatus, TaskType, UserId};

/// User-editable part of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetails {
    pub title: String,
    pub description: String,
    pub subject_id: String,
    pub period_id: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub task_type: TaskType,
    pub estimated_hours: f64,
    pub tags: Vec<String>,
    pub is_group_work: bool,
    pub group_members: Vec<String>,
    pub attachments: Vec<String>,
}

impl TaskDetails {
    /// Check the field-level invariants
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title", "title is required"));
        }
        if self.subject_id.trim().is_empty() {
            return Err(DomainError::validation("subjectId", "subject ID is required"));
        }
        if !self.estimated_hours.is_finite() || self.estimated_hours < 0.0 {
            return Err(DomainError::validation(
                "estimatedTimeHours",
                "estimated hours must be a non-negative number",
            ));
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.due_date = normalize_instant(self.due_date);
        self
    }
}

/// Task aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    user_id: UserId,
    details: TaskDetails,
    status: TaskStatus,
    actual_hours: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task in `todo` status
    ///
    /// # Errors
    /// Returns `ValidationError` if the owner, title or subject is empty.
    pub fn create(user_id: UserId, details: TaskDetails, now: DateTime<Utc>) -> DomainResult<Self> {
        if user_id.is_empty() {
            return Err(DomainError::validation("userId", "user ID is required"));
        }
        details.validate()?;

        let now = normalize_instant(now);
        Ok(Self {
            id: TaskId::new(),
            user_id,
            details: details.normalized(),
            status: TaskStatus::Todo,
            actual_hours: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        })
    }

    /// Reconstitute a task from persistence
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: TaskId,
        user_id: UserId,
        details: TaskDetails,
        status: TaskStatus,
        actual_hours: Option<f64>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            user_id,
            details: details.normalized(),
            status,
            actual_hours,
            created_at: normalize_instant(created_at),
            updated_at: normalize_instant(updated_at),
            completed_at: completed_at.map(normalize_instant),
        }
    }

    /// Replace the editable fields
    ///
    /// # Errors
    /// `BusinessRuleViolation` when the task is done or cancelled,
    /// `ValidationError` when the new details are invalid.
    pub fn update_details(&mut self, details: TaskDetails, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_can_be_modified()?;
        details.validate()?;

        self.details = details.normalized();
        self.updated_at = normalize_instant(now);
        Ok(())
    }

    /// Move the task to another status
    ///
    /// Moving to `done` stamps `completed_at` unless it is already set.
    pub fn change_status(&mut self, status: TaskStatus, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_can_be_modified()?;

        let now = normalize_instant(now);
        self.status = status;
        self.completed_at = match status {
            TaskStatus::Done => self.completed_at.or(Some(now)),
            _ => None,
        };
        self.updated_at = now;
        Ok(())
    }

    /// Mark the task as done
    ///
    /// Completing a task that is already done leaves it untouched and returns
    /// `false`; the first `completed_at` is kept.
    ///
    /// # Errors
    /// `BusinessRuleViolation` for cancelled tasks, `ValidationError` for
    /// negative actual hours.
    pub fn complete(&mut self, actual_hours: Option<f64>, now: DateTime<Utc>) -> DomainResult<bool> {
        match self.status {
            TaskStatus::Done => return Ok(false),
            TaskStatus::Cancelled => {
                return Err(DomainError::rule("cancelled tasks cannot be completed"));
            }
            _ => {}
        }

        if let Some(hours) = actual_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(DomainError::validation(
                    "actualTimeHours",
                    "actual hours must be a non-negative number",
                ));
            }
            self.actual_hours = Some(hours);
        }

        let now = normalize_instant(now);
        self.status = TaskStatus::Done;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(true)
    }

    /// Whether the task still accepts changes
    pub fn can_be_modified(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether the task may be deleted
    pub fn can_be_deleted(&self) -> bool {
        self.status != TaskStatus::Done
    }

    pub fn ensure_can_be_modified(&self) -> DomainResult<()> {
        if self.can_be_modified() {
            Ok(())
        } else {
            Err(DomainError::rule(format!(
                "task in status {} cannot be modified",
                self.status
            )))
        }
    }

    pub fn ensure_can_be_deleted(&self) -> DomainResult<()> {
        if self.can_be_deleted() {
            Ok(())
        } else {
            Err(DomainError::rule("completed tasks cannot be deleted"))
        }
    }

    /// Check every aggregate invariant
    pub fn validate(&self) -> DomainResult<()> {
        if self.user_id.is_empty() {
            return Err(DomainError::validation("userId", "user ID is required"));
        }
        self.details.validate()?;

        match (self.status, self.completed_at) {
            (TaskStatus::Done, None) => Err(DomainError::validation(
                "completedAt",
                "done tasks must have a completion time",
            )),
            (status, Some(_)) if status != TaskStatus::Done => Err(DomainError::validation(
                "completedAt",
                "only done tasks have a completion time",
            )),
            _ => Ok(()),
        }
    }

    /// Past due and not done
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.details.due_date < now && self.status != TaskStatus::Done
    }

    /// Due within `[from, until]`
    pub fn is_due_within(&self, from: DateTime<Utc>, until: DateTime<Utc>) -> bool {
        from <= self.details.due_date && self.details.due_date <= until
    }

    // Getters

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn details(&self) -> &TaskDetails {
        &self.details
    }

    pub fn title(&self) -> &str {
        &self.details.title
    }

    pub fn description(&self) -> &str {
        &self.details.description
    }

    pub fn subject_id(&self) -> &str {
        &self.details.subject_id
    }

    pub fn period_id(&self) -> &str {
        &self.details.period_id
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.details.due_date
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn priority(&self) -> TaskPriority {
        self.details.priority
    }

    pub fn task_type(&self) -> TaskType {
        self.details.task_type
    }

    pub fn estimated_hours(&self) -> f64 {
        self.details.estimated_hours
    }

    pub fn actual_hours(&self) -> Option<f64> {
        self.actual_hours
    }

    pub fn tags(&self) -> &[String] {
        &self.details.tags
    }

    pub fn is_group_work(&self) -> bool {
        self.details.is_group_work
    }

    pub fn group_members(&self) -> &[String] {
        &self.details.group_members
    }

    pub fn attachments(&self) -> &[String] {
        &self.details.attachments
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}
