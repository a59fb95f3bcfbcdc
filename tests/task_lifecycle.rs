//! End-to-end task scenarios: configuration, repository bootstrap and the
//! task service working together on both storage backends.

mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;

use uniflow_application::{
    ChangeStatusCommand, CompleteTaskCommand, CreateTaskCommand, InMemoryReminderQueue,
    RequestContext, TaskFilterQuery, TaskService, TaskServiceOptions,
};
use uniflow_config::{init_tracing, AppConfig, ConfigManager, StorageBackend};
use uniflow_domain::reminder::ReminderPayload;
use uniflow_domain::repositories::TaskRepository;
use uniflow_domain::time::FixedClock;
use uniflow_domain::user::UserContext;
use uniflow_domain::value_objects::TaskStatus;
use uniflow_persistence::build_task_repository;

use common::{backends, now};

fn options_from(config: &AppConfig) -> TaskServiceOptions {
    TaskServiceOptions {
        reminder_policy: config.reminders.policy(),
        reminders_enabled: config.reminders.enabled,
        read_timeout: config.timeouts.read(),
        write_timeout: config.timeouts.write(),
        default_timezone: config.query.default_timezone.clone(),
    }
}

fn student() -> UserContext {
    UserContext::new("student-7")
        .with_email("leo@example.edu")
        .with_name("Leo")
}

fn command(title: &str, due_in: Duration) -> CreateTaskCommand {
    serde_json::from_value(serde_json::json!({
        "title": title,
        "subjectId": "phys-150",
        "periodId": "2025-2",
        "dueDate": now() + due_in,
        "priority": "medium",
        "type": "assignment"
    }))
    .unwrap()
}

fn service_on(
    repo: Arc<dyn TaskRepository>,
    queue: Arc<InMemoryReminderQueue>,
) -> TaskService<dyn TaskRepository> {
    TaskService::new(repo)
        .with_clock(Arc::new(FixedClock::new(now())))
        .with_reminder_queue(queue)
        .with_options(options_from(&AppConfig::default()))
}

#[tokio::test]
async fn test_task_due_in_two_hours_is_today_and_upcoming() {
    for (backend, repo) in backends().await {
        let service = service_on(repo, Arc::new(InMemoryReminderQueue::new()));
        let ctx = RequestContext::new();

        let task = service
            .create(&ctx, &student(), command("Problem set", Duration::hours(2)))
            .await
            .unwrap();
        let dashboard = service.dashboard(&ctx, &student(), Some("UTC")).await.unwrap();

        assert_eq!(dashboard.today_tasks.len(), 1, "{}", backend);
        assert_eq!(dashboard.today_tasks[0].id, task.id);
        assert_eq!(dashboard.upcoming_tasks.len(), 1, "{}", backend);
        assert_eq!(dashboard.upcoming_tasks[0].id, task.id);
        assert_eq!(dashboard.todo_count, 1);
        assert_eq!(dashboard.total_pending, 1);
    }
}

#[tokio::test]
async fn test_task_one_hour_late_is_overdue() {
    for (backend, repo) in backends().await {
        let service = service_on(repo, Arc::new(InMemoryReminderQueue::new()));
        let ctx = RequestContext::new();

        let late = service
            .create(&ctx, &student(), command("Late lab", -Duration::hours(1)))
            .await
            .unwrap();

        let dashboard = service.dashboard(&ctx, &student(), None).await.unwrap();
        assert_eq!(dashboard.overdue_count, 1, "{}", backend);

        let flagged = service
            .list(
                &ctx,
                &student(),
                &TaskFilterQuery {
                    is_overdue: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(flagged.ids(), vec![late.id.as_str()], "{}", backend);

        let excluded = service
            .list(
                &ctx,
                &student(),
                &TaskFilterQuery {
                    is_overdue: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(excluded.tasks.is_empty(), "{}", backend);
        assert_eq!(excluded.pagination.total, 0);
    }
}

#[tokio::test]
async fn test_reminder_for_task_due_in_ten_days_is_capped() {
    let queue = Arc::new(InMemoryReminderQueue::new());
    let repo = build_task_repository(&AppConfig::default().storage).await.unwrap();
    let service = service_on(repo, queue.clone());

    let task = service
        .create(&RequestContext::new(), &student(), command("Final project", Duration::days(10)))
        .await
        .unwrap();
    service.flush_reminders().await;

    let messages = queue.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].visibility_delay, StdDuration::from_secs(7 * 24 * 60 * 60));

    let payload: ReminderPayload = serde_json::from_str(&messages[0].body).unwrap();
    assert_eq!(payload.task_id, task.id);
    assert_eq!(payload.user_id, "student-7");
    assert_eq!(payload.name, "Leo");
    assert_eq!(payload.message, "Task 'Final project' is due in 3 days");
    assert_eq!(payload.due_date, "2025-10-24T15:30:00Z");
}

#[tokio::test]
async fn test_full_lifecycle_on_both_backends() {
    for (backend, repo) in backends().await {
        let queue = Arc::new(InMemoryReminderQueue::new());
        let service = service_on(repo, queue.clone());
        let ctx = RequestContext::new();
        let user = student();

        let task = service
            .create(&ctx, &user, command("Optics report", Duration::days(4)))
            .await
            .unwrap();

        let mut edit = command("Optics report v2", Duration::days(5));
        edit.tags = vec!["lab".to_string()];
        let updated = service
            .update_details(&ctx, &user, &task.id, edit)
            .await
            .unwrap();
        assert_eq!(updated.title, "Optics report v2", "{}", backend);
        assert_eq!(updated.tags, vec!["lab".to_string()]);

        service
            .change_status(&ctx, &user, &task.id, ChangeStatusCommand::new("in-progress"))
            .await
            .unwrap();
        let done = service
            .complete(&ctx, &user, &task.id, CompleteTaskCommand { actual_time_hours: Some(6.0) })
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Done);
        assert_eq!(done.completed_at, Some(now()));

        let again = service
            .complete(&ctx, &user, &task.id, CompleteTaskCommand::default())
            .await
            .unwrap();
        assert_eq!(again.completed_at, done.completed_at, "{}", backend);

        let completed = service.completed(&ctx, &user, None, None).await.unwrap();
        assert_eq!(completed.ids(), vec![task.id.as_str()], "{}", backend);

        let dashboard = service.dashboard(&ctx, &user, None).await.unwrap();
        assert_eq!(dashboard.completed_this_week, 1, "{}", backend);
        assert_eq!(dashboard.total_pending, 0);

        assert!(service.delete(&ctx, &user, &task.id).await.is_err());
        service.flush_reminders().await;
        assert_eq!(queue.len(), 1, "{}", backend);
    }
}

#[tokio::test]
async fn test_pagination_scenario_through_the_service() {
    for (backend, repo) in backends().await {
        let service = service_on(repo, Arc::new(InMemoryReminderQueue::new()));
        let ctx = RequestContext::new();
        for i in 1..=25 {
            service
                .create(&ctx, &student(), command(&format!("Task {:02}", i), Duration::hours(i)))
                .await
                .unwrap();
        }

        let page = service
            .list(
                &ctx,
                &student(),
                &TaskFilterQuery {
                    page: Some(3),
                    limit: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let titles: Vec<&str> = page.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Task 21", "Task 22", "Task 23", "Task 24", "Task 25"], "{}", backend);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }
}

#[tokio::test]
async fn test_configuration_drives_service_and_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uniflow.toml");
    std::fs::write(
        &path,
        r#"
[storage]
backend = "surreal"

[storage.surreal]
mode = "memory"
namespace = "lifecycle"

[reminders]
enabled = true
lead_days = 1
max_delay_secs = 3600

[query]
default_timezone = "America/Bogota"

[timeouts]
read_secs = 2
"#,
    )
    .unwrap();

    let config = ConfigManager::with_path(&path)
        .with_env_prefix("UNIFLOW_LIFECYCLE_TEST")
        .load()
        .unwrap();
    assert_eq!(config.storage.backend, StorageBackend::Surreal);
    let _ = init_tracing(&config.logging);

    let options = options_from(&config);
    assert_eq!(options.read_timeout, StdDuration::from_secs(2));
    assert_eq!(options.reminder_policy.lead_days, 1);
    assert_eq!(options.default_timezone, "America/Bogota");

    let queue = Arc::new(InMemoryReminderQueue::new());
    let repo = build_task_repository(&config.storage).await.unwrap();
    let service = TaskService::new(repo)
        .with_clock(Arc::new(FixedClock::new(now())))
        .with_reminder_queue(queue.clone())
        .with_options(options);

    service
        .create(&RequestContext::new(), &student(), command("Seminar", Duration::days(3)))
        .await
        .unwrap();
    service.flush_reminders().await;
    assert_eq!(queue.messages()[0].visibility_delay, StdDuration::from_secs(3600));

    // 03:30 UTC tomorrow is still 22:30 today in Bogota
    service
        .create(&RequestContext::new(), &student(), command("Evening reading", Duration::hours(12)))
        .await
        .unwrap();

    let local = service.dashboard(&RequestContext::new(), &student(), None).await.unwrap();
    assert_eq!(local.today_tasks.len(), 1);
    assert_eq!(local.today_tasks[0].title, "Evening reading");
    assert_eq!(local.upcoming_tasks.len(), 2);

    let utc = service
        .dashboard(&RequestContext::new(), &student(), Some("UTC"))
        .await
        .unwrap();
    assert!(utc.today_tasks.is_empty());
}

#[tokio::test]
async fn test_invalid_filter_parameters_are_rejected() {
    let repo = build_task_repository(&AppConfig::default().storage).await.unwrap();
    let service = service_on(repo, Arc::new(InMemoryReminderQueue::new()));
    let ctx = RequestContext::new();

    let bad_sort = TaskFilterQuery {
        sort_by: Some("title".into()),
        ..Default::default()
    };
    assert!(service.list(&ctx, &student(), &bad_sort).await.is_err());

    let bad_tz = TaskFilterQuery {
        due_date_from: Some("2025-10-01".into()),
        tz: Some("Mars/Olympus".into()),
        ..Default::default()
    };
    assert!(matches!(
        service.list(&ctx, &student(), &bad_tz).await,
        Err(uniflow_application::ApplicationError::Configuration(_))
    ));
}
