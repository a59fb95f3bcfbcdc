//! Query-parameter mapping for task listings

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use uniflow_domain::errors::DomainError;
use uniflow_domain::query::{FilterSpec, Pagination, SortField, SortOrder, DEFAULT_PAGE_SIZE};
use uniflow_domain::time::{local_day_bounds, resolve_timezone};
use uniflow_domain::value_objects::UserId;

use crate::errors::{ApplicationError, ApplicationResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw listing parameters, one field per query-string key
///
/// Multi-valued fields are comma-separated. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskFilterQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub subject_id: Option<String>,
    pub period_id: Option<String>,
    pub due_date_from: Option<String>,
    pub due_date_to: Option<String>,
    pub is_overdue: Option<bool>,
    pub is_due_soon: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub tz: Option<String>,
}

impl TaskFilterQuery {
    /// Normalize into a [`FilterSpec`] for `user_id`
    ///
    /// `default_timezone` applies when `tz` is absent. Date bounds cover whole
    /// days in that timezone, so an unknown timezone is rejected when a bound
    /// is present; otherwise it only affects the relative windows, which fall
    /// back to UTC.
    ///
    /// # Errors
    /// `ValidationFailed` for unknown enum values and malformed dates,
    /// `Configuration` for an unknown timezone that a date bound needs.
    pub fn to_filter_spec(&self, user_id: UserId, default_timezone: &str) -> ApplicationResult<FilterSpec> {
        let timezone = non_blank(&self.tz).unwrap_or(default_timezone).to_string();

        let mut spec = FilterSpec::for_user(user_id)
            .with_statuses(parse_list(&self.status)?)
            .with_priorities(parse_list(&self.priority)?)
            .with_types(parse_list(&self.task_type)?)
            .paged(Pagination::new(
                self.page.unwrap_or(1),
                self.limit.unwrap_or(DEFAULT_PAGE_SIZE as i64),
            ));

        if let Some(subject) = non_blank(&self.subject_id) {
            spec = spec.with_subject(subject);
        }
        if let Some(period) = non_blank(&self.period_id) {
            spec = spec.with_period(period);
        }

        let from = parse_date("dueDateFrom", &self.due_date_from)?;
        let to = parse_date("dueDateTo", &self.due_date_to)?;
        if from.is_some() || to.is_some() {
            let tz = resolve_timezone(&timezone)?;
            spec = spec.due_between(
                from.map(|day| local_day_bounds(day, &tz).0),
                to.map(|day| local_day_bounds(day, &tz).1),
            );
        }

        if let Some(overdue) = self.is_overdue {
            spec = spec.overdue(overdue);
        }
        if let Some(soon) = self.is_due_soon {
            spec = spec.due_soon(soon);
        }
        if let Some(text) = non_blank(&self.search) {
            spec = spec.with_text(text);
        }

        let sort_by = match non_blank(&self.sort_by) {
            Some(raw) => raw.parse::<SortField>()?,
            None => SortField::default(),
        };
        let sort_order = match non_blank(&self.sort_order) {
            Some(raw) => raw.parse::<SortOrder>()?,
            None => SortOrder::default(),
        };

        Ok(spec.sorted_by(sort_by, sort_order).in_timezone(timezone))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_list<T>(raw: &Option<String>) -> ApplicationResult<Vec<T>>
where
    T: FromStr<Err = DomainError>,
{
    let Some(raw) = non_blank(raw) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(ApplicationError::from))
        .collect()
}

fn parse_date(field: &str, raw: &Option<String>) -> ApplicationResult<Option<NaiveDate>> {
    non_blank(raw)
        .map(|value| {
            NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
                ApplicationError::ValidationFailed(format!(
                    "{}: expected YYYY-MM-DD, got {}",
                    field, value
                ))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uniflow_domain::value_objects::{TaskPriority, TaskStatus, TaskType};

    fn user() -> UserId {
        UserId::new("u-1")
    }

    #[test]
    fn test_empty_query_is_unrestricted() {
        let spec = TaskFilterQuery::default().to_filter_spec(user(), "UTC").unwrap();
        assert_eq!(spec, FilterSpec::for_user(user()));
    }

    #[test]
    fn test_comma_separated_lists() {
        let query = TaskFilterQuery {
            status: Some("todo, in-progress,".into()),
            priority: Some("urgent".into()),
            task_type: Some("group-work,exam".into()),
            ..Default::default()
        };
        let spec = query.to_filter_spec(user(), "UTC").unwrap();

        assert_eq!(spec.statuses.len(), 2);
        assert!(spec.statuses.contains(&TaskStatus::InProgress));
        assert!(spec.priorities.contains(&TaskPriority::Urgent));
        assert!(spec.types.contains(&TaskType::GroupWork));
        assert!(spec.types.contains(&TaskType::Exam));
    }

    #[test]
    fn test_unknown_status_is_validation_failure() {
        let query = TaskFilterQuery {
            status: Some("todo,archived".into()),
            ..Default::default()
        };
        assert!(matches!(
            query.to_filter_spec(user(), "UTC"),
            Err(ApplicationError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_date_bounds_cover_whole_local_days() {
        let query = TaskFilterQuery {
            due_date_from: Some("2025-03-10".into()),
            due_date_to: Some("2025-03-10".into()),
            tz: Some("America/Bogota".into()),
            ..Default::default()
        };
        let spec = query.to_filter_spec(user(), "UTC").unwrap();

        // Bogota is UTC-5 all year
        assert_eq!(spec.due_from, Some(Utc.with_ymd_and_hms(2025, 3, 10, 5, 0, 0).unwrap()));
        let to = spec.due_to.unwrap();
        assert!(to < Utc.with_ymd_and_hms(2025, 3, 11, 5, 0, 0).unwrap());
        assert!(to > Utc.with_ymd_and_hms(2025, 3, 11, 4, 59, 59).unwrap());
        assert_eq!(spec.timezone, "America/Bogota");
    }

    #[test]
    fn test_malformed_date_is_validation_failure() {
        let query = TaskFilterQuery {
            due_date_to: Some("10/03/2025".into()),
            ..Default::default()
        };
        assert!(matches!(
            query.to_filter_spec(user(), "UTC"),
            Err(ApplicationError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_unknown_timezone_with_dates_is_configuration_error() {
        let query = TaskFilterQuery {
            due_date_from: Some("2025-03-10".into()),
            tz: Some("Mars/Olympus".into()),
            ..Default::default()
        };
        assert!(matches!(
            query.to_filter_spec(user(), "UTC"),
            Err(ApplicationError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_timezone_without_dates_passes_through() {
        let query = TaskFilterQuery {
            is_due_soon: Some(true),
            tz: Some("Mars/Olympus".into()),
            ..Default::default()
        };
        let spec = query.to_filter_spec(user(), "UTC").unwrap();
        assert_eq!(spec.timezone, "Mars/Olympus");
        assert_eq!(spec.is_due_soon, Some(true));
    }

    #[test]
    fn test_sort_and_paging() {
        let query = TaskFilterQuery {
            sort_by: Some("priority".into()),
            sort_order: Some("DESC".into()),
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        let spec = query.to_filter_spec(user(), "UTC").unwrap();
        assert_eq!(spec.sort_by, SortField::Priority);
        assert_eq!(spec.sort_order, SortOrder::Desc);
        assert_eq!(spec.pagination.page(), 1);
        assert_eq!(spec.pagination.limit(), 100);
    }

    #[test]
    fn test_deserializes_from_query_names() {
        let query: TaskFilterQuery = serde_json::from_value(serde_json::json!({
            "type": "quiz",
            "subjectId": "math",
            "isOverdue": false,
            "dueDateFrom": "2025-01-01"
        }))
        .unwrap();
        assert_eq!(query.task_type.as_deref(), Some("quiz"));
        assert_eq!(query.subject_id.as_deref(), Some("math"));
        assert_eq!(query.is_overdue, Some(false));
    }
}
