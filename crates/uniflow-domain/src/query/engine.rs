//! Predicate, ordering and pagination rules shared by every backend
//!
//! The scan adapter evaluates [`QueryPlan`] directly; the query-translation
//! adapter renders the same plan into its store's language. Both read the
//! window bounds and text tokens from the plan so they cannot drift apart.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::filter::{FilterSpec, SortField, SortOrder};
use super::page::{Page, PageInfo};
use crate::task::Task;
use crate::time::{normalize_instant, RelativeWindow};

/// A [`FilterSpec`] bound to a single `now`
#[derive(Debug, Clone)]
pub struct QueryPlan<'a> {
    spec: &'a FilterSpec,
    window: RelativeWindow,
    tokens: Vec<String>,
}

impl<'a> QueryPlan<'a> {
    pub fn new(spec: &'a FilterSpec, now: DateTime<Utc>) -> Self {
        Self {
            spec,
            window: spec.relative_window(normalize_instant(now)),
            tokens: spec.text_tokens(),
        }
    }

    pub fn spec(&self) -> &FilterSpec {
        self.spec
    }

    pub fn window(&self) -> &RelativeWindow {
        &self.window
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether a task survives every active predicate
    pub fn matches(&self, task: &Task) -> bool {
        let spec = self.spec;

        if task.user_id() != &spec.user_id {
            return false;
        }
        if !spec.statuses.is_empty() && !spec.statuses.contains(&task.status()) {
            return false;
        }
        if !spec.priorities.is_empty() && !spec.priorities.contains(&task.priority()) {
            return false;
        }
        if !spec.types.is_empty() && !spec.types.contains(&task.task_type()) {
            return false;
        }
        if spec.subject_filter().is_some_and(|s| s != task.subject_id()) {
            return false;
        }
        if spec.period_filter().is_some_and(|p| p != task.period_id()) {
            return false;
        }
        if spec.due_from.is_some_and(|from| task.due_date() < from) {
            return false;
        }
        if spec.due_to.is_some_and(|to| task.due_date() > to) {
            return false;
        }
        if let Some(wanted) = spec.is_overdue {
            if task.is_overdue(self.window.now) != wanted {
                return false;
            }
        }
        if let Some(wanted) = spec.is_due_soon {
            if task.is_due_within(self.window.now, self.window.soon_end) != wanted {
                return false;
            }
        }
        self.matches_text(task)
    }

    /// Every token must occur in the title or the description
    fn matches_text(&self, task: &Task) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let title = task.title().to_lowercase();
        let description = task.description().to_lowercase();
        self.tokens
            .iter()
            .all(|token| title.contains(token.as_str()) || description.contains(token.as_str()))
    }

    /// Requested order, ties broken by ascending task id
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let primary = compare_by(self.spec.sort_by, a, b);
        let primary = match self.spec.sort_order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id().cmp(b.id()))
    }

    /// Filter, order and paginate an owned collection
    pub fn execute(&self, tasks: impl IntoIterator<Item = Task>) -> Page<Task> {
        let mut matched: Vec<Task> = tasks.into_iter().filter(|t| self.matches(t)).collect();
        matched.sort_by(|a, b| self.compare(a, b));
        paginate(matched, self.spec)
    }
}

fn compare_by(field: SortField, a: &Task, b: &Task) -> Ordering {
    match field {
        SortField::DueDate => a.due_date().cmp(&b.due_date()),
        SortField::Priority => a.priority().rank().cmp(&b.priority().rank()),
        SortField::Status => a.status().rank().cmp(&b.status().rank()),
        SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
    }
}

/// Slice an already filtered and ordered collection
///
/// An out-of-range page yields no items but keeps the real total.
pub fn paginate<T>(sorted: Vec<T>, spec: &FilterSpec) -> Page<T> {
    let total = sorted.len();
    let pagination = spec.pagination;
    let start = usize::try_from(pagination.offset())
        .unwrap_or(usize::MAX)
        .min(total);
    let end = start.saturating_add(pagination.limit() as usize).min(total);

    let items = sorted.into_iter().skip(start).take(end - start).collect();
    Page::new(items, PageInfo::new(total as u64, pagination))
}

/// Filter, order and paginate `tasks` for `spec` at `now`
pub fn execute(tasks: impl IntoIterator<Item = Task>, spec: &FilterSpec, now: DateTime<Utc>) -> Page<Task> {
    QueryPlan::new(spec, now).execute(tasks)
}
