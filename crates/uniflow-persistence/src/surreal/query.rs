//! Translation of a [`QueryPlan`] into SurrealQL
//!
//! Instants are stored as epoch microseconds and enums alongside their sort
//! rank, so the database compares exactly what the in-memory scan compares.
//! User input only ever reaches the query through bindings; sort columns
//! come from a fixed list and page bounds are integers.

use chrono::{DateTime, Utc};
use serde_json::json;

use uniflow_domain::query::{QueryPlan, SortField, SortOrder};
use uniflow_domain::value_objects::TaskStatus;

use super::connection::Bindings;

/// SurrealDB table holding task documents
pub const TABLE_NAME: &str = "tasks";

/// Statement pair: `[0]` yields the total, `[1]` the page
#[derive(Debug, Clone)]
pub struct SurrealQuery {
    pub sql: String,
    pub bindings: Bindings,
}

/// Epoch microseconds, the stored form of every instant
pub fn to_micros(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_micros()
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::DueDate => "due_at",
        SortField::Priority => "priority_rank",
        SortField::Status => "status_rank",
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
    }
}

fn direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Render the plan's predicates, ordering and page bounds
pub fn translate(plan: &QueryPlan<'_>) -> SurrealQuery {
    let spec = plan.spec();
    let window = plan.window();
    let done = TaskStatus::Done.as_str();

    let mut conditions = vec!["user_id = $user_id".to_string()];
    let mut bindings = Bindings::new();
    bindings.insert("user_id".into(), json!(spec.user_id.as_str()));

    if !spec.statuses.is_empty() {
        conditions.push("status IN $statuses".into());
        let values: Vec<&str> = spec.statuses.iter().map(|s| s.as_str()).collect();
        bindings.insert("statuses".into(), json!(values));
    }
    if !spec.priorities.is_empty() {
        conditions.push("priority IN $priorities".into());
        let values: Vec<&str> = spec.priorities.iter().map(|p| p.as_str()).collect();
        bindings.insert("priorities".into(), json!(values));
    }
    if !spec.types.is_empty() {
        conditions.push("task_type IN $types".into());
        let values: Vec<&str> = spec.types.iter().map(|t| t.as_str()).collect();
        bindings.insert("types".into(), json!(values));
    }
    if let Some(subject) = spec.subject_filter() {
        conditions.push("subject_id = $subject_id".into());
        bindings.insert("subject_id".into(), json!(subject));
    }
    if let Some(period) = spec.period_filter() {
        conditions.push("period_id = $period_id".into());
        bindings.insert("period_id".into(), json!(period));
    }
    if let Some(from) = spec.due_from {
        conditions.push("due_at >= $due_from".into());
        bindings.insert("due_from".into(), json!(to_micros(from)));
    }
    if let Some(to) = spec.due_to {
        conditions.push("due_at <= $due_to".into());
        bindings.insert("due_to".into(), json!(to_micros(to)));
    }

    if spec.is_overdue.is_some() || spec.is_due_soon.is_some() {
        bindings.insert("now_us".into(), json!(to_micros(window.now)));
    }
    match spec.is_overdue {
        Some(true) => conditions.push(format!("(due_at < $now_us AND status != '{}')", done)),
        Some(false) => conditions.push(format!("(due_at >= $now_us OR status = '{}')", done)),
        None => {}
    }
    if let Some(due_soon) = spec.is_due_soon {
        bindings.insert("soon_us".into(), json!(to_micros(window.soon_end)));
        conditions.push(if due_soon {
            "(due_at >= $now_us AND due_at <= $soon_us)".into()
        } else {
            "(due_at < $now_us OR due_at > $soon_us)".into()
        });
    }

    for (i, token) in plan.tokens().iter().enumerate() {
        let name = format!("q{}", i);
        conditions.push(format!(
            "(string::lowercase(title) CONTAINS ${name} OR string::lowercase(description) CONTAINS ${name})"
        ));
        bindings.insert(name, json!(token));
    }

    let where_clause = conditions.join(" AND ");
    let pagination = spec.pagination;
    let sql = format!(
        "SELECT count() AS total FROM {table} WHERE {where_clause} GROUP ALL;\n\
         SELECT * OMIT id FROM {table} WHERE {where_clause} \
         ORDER BY {column} {dir}, task_id ASC LIMIT {limit} START {offset};",
        table = TABLE_NAME,
        column = sort_column(spec.sort_by),
        dir = direction(spec.sort_order),
        limit = pagination.limit(),
        offset = pagination.offset(),
    );

    SurrealQuery { sql, bindings }
}
