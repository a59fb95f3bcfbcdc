//! Backend-agnostic query descriptor

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::time::{normalize_instant, RelativeWindow};
use crate::value_objects::{TaskPriority, TaskStatus, TaskType, UserId};

/// Page size used when the caller asks for none (or a non-positive one)
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller can request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Field a result set is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    DueDate,
    Priority,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::DueDate => "dueDate",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dueDate" => Ok(SortField::DueDate),
            "priority" => Ok(SortField::Priority),
            "status" => Ok(SortField::Status),
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            other => Err(DomainError::validation(
                "sortBy",
                format!("invalid sort field: {}", other),
            )),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DomainError::validation(
                "sortOrder",
                format!("invalid sort order: {}", other),
            )),
        }
    }
}

/// 1-based page request with a bounded page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Normalize raw values: `page <= 0` becomes 1, `limit <= 0` becomes
    /// the default size and anything above the maximum is capped
    pub fn new(page: i64, limit: i64) -> Self {
        let page = if page <= 0 {
            1
        } else {
            page.min(u32::MAX as i64) as u32
        };
        let limit = if limit <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            limit.min(MAX_PAGE_SIZE as i64) as u32
        };
        Self { page, limit }
    }

    /// First page of the given size
    pub fn first(limit: i64) -> Self {
        Self::new(1, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records before this page
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE as i64)
    }
}

/// Normalized query descriptor for listing and searching tasks
///
/// Empty sets and `None` fields do not restrict the result. `is_overdue`
/// and `is_due_soon` select their window when `true` and its complement
/// when `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub user_id: UserId,
    pub statuses: BTreeSet<TaskStatus>,
    pub priorities: BTreeSet<TaskPriority>,
    pub types: BTreeSet<TaskType>,
    pub subject_id: Option<String>,
    pub period_id: Option<String>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
    pub is_overdue: Option<bool>,
    pub is_due_soon: Option<bool>,
    pub text: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub pagination: Pagination,
    pub timezone: String,
}

impl FilterSpec {
    /// Unrestricted query over one user's tasks
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            statuses: BTreeSet::new(),
            priorities: BTreeSet::new(),
            types: BTreeSet::new(),
            subject_id: None,
            period_id: None,
            due_from: None,
            due_to: None,
            is_overdue: None,
            is_due_soon: None,
            text: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            pagination: Pagination::default(),
            timezone: "UTC".to_string(),
        }
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_priorities(mut self, priorities: impl IntoIterator<Item = TaskPriority>) -> Self {
        self.priorities = priorities.into_iter().collect();
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = TaskType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn with_period(mut self, period_id: impl Into<String>) -> Self {
        self.period_id = Some(period_id.into());
        self
    }

    /// Inclusive due-date range; either bound may be open
    pub fn due_between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.due_from = from.map(normalize_instant);
        self.due_to = to.map(normalize_instant);
        self
    }

    pub fn overdue(mut self, overdue: bool) -> Self {
        self.is_overdue = Some(overdue);
        self
    }

    pub fn due_soon(mut self, due_soon: bool) -> Self {
        self.is_due_soon = Some(due_soon);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn sorted_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.sort_order = order;
        self
    }

    pub fn paged(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn in_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Subject restriction, ignoring blank values
    pub fn subject_filter(&self) -> Option<&str> {
        non_blank(self.subject_id.as_deref())
    }

    /// Period restriction, ignoring blank values
    pub fn period_filter(&self) -> Option<&str> {
        non_blank(self.period_id.as_deref())
    }

    /// Lowercased whitespace-separated tokens of the free-text query
    pub fn text_tokens(&self) -> Vec<String> {
        self.text
            .as_deref()
            .map(|text| text.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default()
    }

    /// Overdue and due-soon windows for this query
    pub fn relative_window(&self, now: DateTime<Utc>) -> RelativeWindow {
        RelativeWindow::for_timezone(now, &self.timezone)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.user_id.is_empty() {
            return Err(DomainError::validation("userId", "user ID is required"));
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
