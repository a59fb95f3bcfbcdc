//! Dashboard aggregation
//!
//! A single pass over a user's tasks, anchored on one `now`. Windows share
//! their definitions with the query engine through [`Task::is_overdue`].

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::task::Task;
use crate::time::DayWindow;
use crate::value_objects::TaskStatus;

/// Upcoming list length
pub const UPCOMING_LIMIT: usize = 5;

/// Look-back for the completed-this-week counter
pub const COMPLETED_LOOKBACK: Duration = Duration::days(7);

/// Derived, non-persisted dashboard view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub upcoming_tasks: Vec<Task>,
    pub today_tasks: Vec<Task>,
    pub overdue_count: u64,
    pub total_pending: u64,
    pub completed_this_week: u64,
    pub in_progress_count: u64,
    pub todo_count: u64,
}

/// Builds [`DashboardData`] for a timezone
#[derive(Debug, Clone, Copy)]
pub struct DashboardAggregator {
    timezone: Tz,
}

impl DashboardAggregator {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Aggregate one user's tasks at `now`
    ///
    /// Tasks may appear in both the today and upcoming lists.
    pub fn aggregate(&self, tasks: impl IntoIterator<Item = Task>, now: DateTime<Utc>) -> DashboardData {
        let today = DayWindow::containing(now, &self.timezone);
        let week_ago = now - COMPLETED_LOOKBACK;

        let mut data = DashboardData::default();
        let mut upcoming = Vec::new();

        for task in tasks {
            match task.status() {
                TaskStatus::Todo => data.todo_count += 1,
                TaskStatus::InProgress => data.in_progress_count += 1,
                TaskStatus::Done => {
                    if task.completed_at().is_some_and(|at| at >= week_ago) {
                        data.completed_this_week += 1;
                    }
                }
                _ => {}
            }

            if task.is_overdue(now) {
                data.overdue_count += 1;
            }

            let due_today = today.contains(task.due_date());
            let is_upcoming = task.due_date() > now && task.status() != TaskStatus::Done;

            match (due_today, is_upcoming) {
                (true, true) => {
                    upcoming.push(task.clone());
                    data.today_tasks.push(task);
                }
                (true, false) => data.today_tasks.push(task),
                (false, true) => upcoming.push(task),
                (false, false) => {}
            }
        }

        data.total_pending = data.todo_count + data.in_progress_count;

        by_due_then_id(&mut data.today_tasks);
        by_due_then_id(&mut upcoming);
        upcoming.truncate(UPCOMING_LIMIT);
        data.upcoming_tasks = upcoming;

        data
    }
}

impl Default for DashboardAggregator {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

fn by_due_then_id(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.due_date().cmp(&b.due_date()).then_with(|| a.id().cmp(b.id())));
}
