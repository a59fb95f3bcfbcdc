//! Task Application Service
//!
//! Composition root for the task use cases: validates commands, drives the
//! task aggregate, runs storage calls under the request's cancellation and
//! deadline, and hands new tasks to the reminder scheduler.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use uniflow_domain::dashboard::DashboardAggregator;
use uniflow_domain::errors::DomainResult;
use uniflow_domain::query::{FilterSpec, Pagination, SortField, SortOrder, DEFAULT_PAGE_SIZE};
use uniflow_domain::reminder::{ReminderPolicy, ReminderRecipient};
use uniflow_domain::repositories::TaskRepository;
use uniflow_domain::task::Task;
use uniflow_domain::time::{resolve_timezone, Clock, SystemClock};
use uniflow_domain::user::UserContext;
use uniflow_domain::value_objects::{TaskId, TaskStatus};

use crate::context::RequestContext;
use crate::dto::{
    ChangeStatusCommand, CompleteTaskCommand, CreateTaskCommand, DashboardDto, HealthReport,
    TaskDto, TaskFilterQuery, TaskPageDto, UpdateTaskCommand,
};
use crate::errors::{ApplicationError, ApplicationResult};
use crate::ports::ReminderQueue;

/// Page size of the overdue, by-subject and by-period listings
pub const FIXED_LISTING_LIMIT: i64 = 100;

/// Tunables for [`TaskService`]
#[derive(Debug, Clone, PartialEq)]
pub struct TaskServiceOptions {
    pub reminder_policy: ReminderPolicy,
    pub reminders_enabled: bool,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub default_timezone: String,
}

impl Default for TaskServiceOptions {
    fn default() -> Self {
        Self {
            reminder_policy: ReminderPolicy::default(),
            reminders_enabled: true,
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
            default_timezone: "UTC".to_string(),
        }
    }
}

/// Task Application Service
///
/// Every use case is scoped to the calling user. A task owned by someone
/// else is reported as not found.
pub struct TaskService<R>
where
    R: TaskRepository + ?Sized,
{
    repository: Arc<R>,
    reminders: Option<Arc<dyn ReminderQueue>>,
    clock: Arc<dyn Clock>,
    options: TaskServiceOptions,
    in_flight: TaskTracker,
}

impl<R> TaskService<R>
where
    R: TaskRepository + ?Sized,
{
    /// Create a service over `repository` with the wall clock and no reminders
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            reminders: None,
            clock: Arc::new(SystemClock),
            options: TaskServiceOptions::default(),
            in_flight: TaskTracker::new(),
        }
    }

    /// Enqueue a deadline reminder for every created task
    pub fn with_reminder_queue(mut self, queue: Arc<dyn ReminderQueue>) -> Self {
        self.reminders = Some(queue);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_options(mut self, options: TaskServiceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TaskServiceOptions {
        &self.options
    }

    // === Reads ===

    /// All of the user's tasks, ascending by due date
    pub async fn get_all(&self, ctx: &RequestContext, user: &UserContext) -> ApplicationResult<Vec<TaskDto>> {
        user.validate()?;
        let tasks = self
            .read(ctx, "find_by_user", self.repository.find_by_user(&user.id))
            .await?;
        Ok(tasks.iter().map(TaskDto::from_domain).collect())
    }

    pub async fn get_by_id(&self, ctx: &RequestContext, user: &UserContext, id: &str) -> ApplicationResult<TaskDto> {
        let task = self.load(ctx, user, id).await?;
        Ok(TaskDto::from_domain(&task))
    }

    pub async fn get_by_status(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        status: &str,
    ) -> ApplicationResult<Vec<TaskDto>> {
        user.validate()?;
        let status: TaskStatus = status.parse()?;
        let tasks = self
            .read(ctx, "find_by_status", self.repository.find_by_status(&user.id, status))
            .await?;
        Ok(tasks.iter().map(TaskDto::from_domain).collect())
    }

    // === Mutations ===

    /// Create a task in `todo` status and schedule its deadline reminder
    ///
    /// Reminder failures are logged and never fail the creation.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        cmd: CreateTaskCommand,
    ) -> ApplicationResult<TaskDto> {
        user.validate()?;
        let details = cmd.into_details()?;
        let now = self.clock.now();
        let task = Task::create(user.id.clone(), details, now)?;

        self.write(ctx, "create", self.repository.create(&task)).await?;
        info!(task_id = %task.id(), user_id = %user.id, "Task created");

        self.schedule_reminder(user, &task, now);
        Ok(TaskDto::from_domain(&task))
    }

    /// Replace a task's editable fields
    pub async fn update_details(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        id: &str,
        cmd: UpdateTaskCommand,
    ) -> ApplicationResult<TaskDto> {
        let details = cmd.into_details()?;
        let mut task = self.load(ctx, user, id).await?;
        task.update_details(details, self.clock.now())?;

        self.write(ctx, "update", self.repository.update(&task)).await?;
        info!(task_id = %task.id(), user_id = %user.id, "Task updated");
        Ok(TaskDto::from_domain(&task))
    }

    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        id: &str,
        cmd: ChangeStatusCommand,
    ) -> ApplicationResult<TaskDto> {
        let status = cmd.parse()?;
        let mut task = self.load(ctx, user, id).await?;
        task.change_status(status, self.clock.now())?;

        self.write(ctx, "update", self.repository.update(&task)).await?;
        info!(task_id = %task.id(), status = %status, "Task status changed");
        Ok(TaskDto::from_domain(&task))
    }

    /// Mark a task done
    ///
    /// Completing an already-done task returns it unchanged without writing.
    pub async fn complete(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        id: &str,
        cmd: CompleteTaskCommand,
    ) -> ApplicationResult<TaskDto> {
        let mut task = self.load(ctx, user, id).await?;
        if !task.complete(cmd.actual_time_hours, self.clock.now())? {
            debug!(task_id = %task.id(), "Task already completed");
            return Ok(TaskDto::from_domain(&task));
        }

        self.write(ctx, "update", self.repository.update(&task)).await?;
        info!(task_id = %task.id(), user_id = %user.id, "Task completed");
        Ok(TaskDto::from_domain(&task))
    }

    /// Delete a task; completed tasks are kept
    pub async fn delete(&self, ctx: &RequestContext, user: &UserContext, id: &str) -> ApplicationResult<()> {
        let task = self.load(ctx, user, id).await?;
        task.ensure_can_be_deleted()?;

        self.write(ctx, "delete", self.repository.delete(task.id(), &user.id))
            .await?;
        info!(task_id = %task.id(), user_id = %user.id, "Task deleted");
        Ok(())
    }

    // === Listings ===

    /// Filtered listing from raw query parameters
    pub async fn list(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        query: &TaskFilterQuery,
    ) -> ApplicationResult<TaskPageDto> {
        let spec = query.to_filter_spec(user.id.clone(), &self.options.default_timezone)?;
        self.find(ctx, &spec).await
    }

    /// Free-text search, newest first
    pub async fn search(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        text: &str,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> ApplicationResult<TaskPageDto> {
        if text.trim().is_empty() {
            return Err(ApplicationError::ValidationFailed(
                "search: query is required".into(),
            ));
        }

        let spec = FilterSpec::for_user(user.id.clone())
            .with_text(text.trim())
            .sorted_by(SortField::CreatedAt, SortOrder::Desc)
            .paged(Pagination::new(
                page.unwrap_or(1),
                limit.unwrap_or(DEFAULT_PAGE_SIZE as i64),
            ))
            .in_timezone(self.options.default_timezone.clone());
        self.find(ctx, &spec).await
    }

    /// Overdue tasks, earliest due first
    pub async fn overdue(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        timezone: Option<&str>,
    ) -> ApplicationResult<TaskPageDto> {
        let spec = FilterSpec::for_user(user.id.clone())
            .overdue(true)
            .paged(Pagination::first(FIXED_LISTING_LIMIT))
            .in_timezone(self.timezone_or_default(timezone));
        self.find(ctx, &spec).await
    }

    /// Done tasks, most recently updated first
    pub async fn completed(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> ApplicationResult<TaskPageDto> {
        let spec = FilterSpec::for_user(user.id.clone())
            .with_statuses([TaskStatus::Done])
            .sorted_by(SortField::UpdatedAt, SortOrder::Desc)
            .paged(Pagination::new(
                page.unwrap_or(1),
                limit.unwrap_or(DEFAULT_PAGE_SIZE as i64),
            ))
            .in_timezone(self.options.default_timezone.clone());
        self.find(ctx, &spec).await
    }

    pub async fn by_subject(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        subject_id: &str,
    ) -> ApplicationResult<TaskPageDto> {
        let subject_id = required("subjectId", subject_id)?;
        let spec = FilterSpec::for_user(user.id.clone())
            .with_subject(subject_id)
            .paged(Pagination::first(FIXED_LISTING_LIMIT))
            .in_timezone(self.options.default_timezone.clone());
        self.find(ctx, &spec).await
    }

    pub async fn by_period(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        period_id: &str,
    ) -> ApplicationResult<TaskPageDto> {
        let period_id = required("periodId", period_id)?;
        let spec = FilterSpec::for_user(user.id.clone())
            .with_period(period_id)
            .paged(Pagination::first(FIXED_LISTING_LIMIT))
            .in_timezone(self.options.default_timezone.clone());
        self.find(ctx, &spec).await
    }

    /// Run a prepared query at the service clock's `now`
    pub async fn find(&self, ctx: &RequestContext, spec: &FilterSpec) -> ApplicationResult<TaskPageDto> {
        spec.validate()?;
        let now = self.clock.now();
        let page = self.read(ctx, "find", self.repository.find(spec, now)).await?;
        debug!(
            user_id = %spec.user_id,
            total = page.info.total,
            returned = page.len(),
            "Task query executed"
        );
        Ok(TaskPageDto::from_domain(page))
    }

    // === Dashboard & health ===

    /// Dashboard for the user, with "today" taken in `timezone`
    ///
    /// # Errors
    /// `Configuration` for an unknown timezone.
    pub async fn dashboard(
        &self,
        ctx: &RequestContext,
        user: &UserContext,
        timezone: Option<&str>,
    ) -> ApplicationResult<DashboardDto> {
        user.validate()?;
        let tz = resolve_timezone(&self.timezone_or_default(timezone))?;
        let now = self.clock.now();
        let tasks = self
            .read(ctx, "find_by_user", self.repository.find_by_user(&user.id))
            .await?;

        let data = DashboardAggregator::new(tz).aggregate(tasks, now);
        debug!(
            user_id = %user.id,
            overdue = data.overdue_count,
            pending = data.total_pending,
            "Dashboard aggregated"
        );
        Ok(DashboardDto::from_domain(&data))
    }

    pub fn health(&self) -> HealthReport {
        HealthReport::healthy(self.clock.now())
    }

    /// Wait for every reminder enqueue started so far
    pub async fn flush_reminders(&self) {
        self.in_flight.close();
        self.in_flight.wait().await;
        self.in_flight.reopen();
    }

    // === Internals ===

    async fn load(&self, ctx: &RequestContext, user: &UserContext, id: &str) -> ApplicationResult<Task> {
        user.validate()?;
        let task_id = TaskId::from_string(required("id", id)?);
        self.read(ctx, "find_by_id", self.repository.find_by_id(&task_id, &user.id))
            .await?
            .ok_or_else(|| ApplicationError::TaskNotFound(id.to_string()))
    }

    async fn read<T, F>(&self, ctx: &RequestContext, operation: &'static str, call: F) -> ApplicationResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        debug!(operation, "Repository read");
        ctx.run(operation, self.options.read_timeout, async move {
            call.await
                .map_err(|e| ApplicationError::from_repository(operation, e))
        })
        .await
    }

    async fn write<T, F>(&self, ctx: &RequestContext, operation: &'static str, call: F) -> ApplicationResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        debug!(operation, "Repository write");
        ctx.run(operation, self.options.write_timeout, async move {
            call.await
                .map_err(|e| ApplicationError::from_repository(operation, e))
        })
        .await
    }

    fn timezone_or_default(&self, timezone: Option<&str>) -> String {
        timezone
            .map(str::trim)
            .filter(|tz| !tz.is_empty())
            .unwrap_or(&self.options.default_timezone)
            .to_string()
    }

    fn schedule_reminder(&self, user: &UserContext, task: &Task, now: DateTime<Utc>) {
        if !self.options.reminders_enabled {
            return;
        }
        let Some(queue) = self.reminders.as_ref().map(Arc::clone) else {
            debug!(task_id = %task.id(), "No reminder queue configured");
            return;
        };

        let scheduled = self
            .options
            .reminder_policy
            .schedule(task, &ReminderRecipient::from(user), now);
        let body = match scheduled.payload.to_json() {
            Ok(body) => body,
            Err(e) => {
                warn!(task_id = %task.id(), error = %e, "Failed to encode reminder");
                return;
            }
        };

        let task_id = task.id().to_string();
        let delay = scheduled.delay;
        let limit = self.options.write_timeout;
        self.in_flight.spawn(async move {
            match tokio::time::timeout(limit, queue.enqueue(body, delay)).await {
                Ok(Ok(())) => {
                    info!(task_id = %task_id, delay_secs = delay.as_secs(), "Reminder enqueued")
                }
                Ok(Err(e)) => warn!(task_id = %task_id, error = %e, "Failed to enqueue reminder"),
                Err(_) => warn!(task_id = %task_id, "Reminder enqueue timed out"),
            }
        });
    }
}

fn required<'a>(field: &str, value: &'a str) -> ApplicationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(ApplicationError::ValidationFailed(format!("{}: value is required", field)))
    } else {
        Ok(value)
    }
}
