//! Deadline reminder scheduling
//!
//! Computes when a queued reminder should become visible. Pure: the caller
//! supplies `now` and performs the enqueue.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{DomainError, DomainResult};
use crate::task::Task;
use crate::user::UserContext;
use crate::value_objects::TaskPriority;

/// Message type tag understood by the notification consumer
pub const DEADLINE_REMINDER: &str = "deadline_reminder";

/// Longest accepted lead time
pub const MAX_LEAD_DAYS: u32 = 365;

/// Lead time and delay bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPolicy {
    pub lead_days: u32,
    pub max_delay: Duration,
    pub min_delay: Duration,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            lead_days: 3,
            max_delay: Duration::from_secs(7 * 24 * 60 * 60),
            min_delay: Duration::from_secs(1),
        }
    }
}

/// Which bound, if any, the computed delay was moved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayClamp {
    Unclamped,
    RaisedToMinimum,
    CappedAtMaximum,
}

/// Who receives the reminder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReminderRecipient {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl From<&UserContext> for ReminderRecipient {
    fn from(user: &UserContext) -> Self {
        Self {
            user_id: user.id.as_str().to_string(),
            name: user.name.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
        }
    }
}

/// Queue message body
///
/// Depends only on the task and recipient, never on the delay or the
/// moment it was computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub task_id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: TaskPriority,
    pub due_date: String,
}

impl ReminderPayload {
    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string(self).map_err(|e| DomainError::ExternalServiceError {
            service: "reminder-queue".to_string(),
            reason: format!("failed to encode reminder: {}", e),
        })
    }
}

/// Payload plus the visibility delay to enqueue it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReminder {
    pub payload: ReminderPayload,
    pub delay: Duration,
    pub clamp: DelayClamp,
}

impl ReminderPolicy {
    /// Reject policies whose bounds cannot hold
    pub fn validate(&self) -> DomainResult<()> {
        if self.min_delay.is_zero() {
            return Err(DomainError::InvalidConfiguration {
                reason: "reminder minimum delay must be positive".to_string(),
            });
        }
        if self.lead_days > MAX_LEAD_DAYS {
            return Err(DomainError::InvalidConfiguration {
                reason: format!("reminder lead days must not exceed {}", MAX_LEAD_DAYS),
            });
        }
        if self.min_delay > self.max_delay {
            return Err(DomainError::InvalidConfiguration {
                reason: "reminder minimum delay exceeds maximum delay".to_string(),
            });
        }
        Ok(())
    }

    /// Delay until `lead_days` before `due`, clamped to `[min_delay, max_delay]`
    ///
    /// A delay that lands exactly on `max_delay` counts as capped. A reminder
    /// time before the representable range is treated as already past.
    pub fn visibility_delay(&self, due: DateTime<Utc>, now: DateTime<Utc>) -> (Duration, DelayClamp) {
        let reminder_at = chrono::Duration::try_days(i64::from(self.lead_days))
            .and_then(|lead| due.checked_sub_signed(lead));
        let Some(reminder_at) = reminder_at else {
            return (self.min_delay, DelayClamp::RaisedToMinimum);
        };
        match (reminder_at - now).to_std() {
            Ok(delay) if delay >= self.max_delay => (self.max_delay, DelayClamp::CappedAtMaximum),
            Ok(delay) if delay >= self.min_delay => (delay, DelayClamp::Unclamped),
            // zero, negative or below the floor
            _ => (self.min_delay, DelayClamp::RaisedToMinimum),
        }
    }

    /// Build the reminder for a freshly created task
    pub fn schedule(&self, task: &Task, recipient: &ReminderRecipient, now: DateTime<Utc>) -> ScheduledReminder {
        let (delay, clamp) = self.visibility_delay(task.due_date(), now);
        if clamp == DelayClamp::CappedAtMaximum {
            warn!(
                task_id = %task.id(),
                max_delay_secs = self.max_delay.as_secs(),
                "reminder delay exceeds queue maximum, capping"
            );
        }

        ScheduledReminder {
            payload: self.payload(task, recipient),
            delay,
            clamp,
        }
    }

    fn payload(&self, task: &Task, recipient: &ReminderRecipient) -> ReminderPayload {
        ReminderPayload {
            task_id: task.id().to_string(),
            user_id: recipient.user_id.clone(),
            name: recipient.name.clone(),
            email: recipient.email.clone(),
            title: task.title().to_string(),
            message: format!(
                "Task '{}' is due in {} days",
                task.title(),
                self.lead_days
            ),
            kind: DEADLINE_REMINDER.to_string(),
            priority: task.priority(),
            due_date: task.due_date().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDetails;
    use crate::value_objects::{TaskType, UserId};
    use chrono::TimeZone;

    const DAY: u64 = 24 * 60 * 60;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 10, 12, 0, 0).unwrap()
    }

    fn task_due_in(days: i64) -> Task {
        let details = TaskDetails {
            title: "Thesis chapter".into(),
            description: String::new(),
            subject_id: "lit".into(),
            period_id: String::new(),
            due_date: now() + chrono::Duration::days(days),
            priority: TaskPriority::Urgent,
            task_type: TaskType::Essay,
            estimated_hours: 10.0,
            tags: vec![],
            is_group_work: false,
            group_members: vec![],
            attachments: vec![],
        };
        Task::create(UserId::new("u-1"), details, now()).unwrap()
    }

    fn recipient() -> ReminderRecipient {
        ReminderRecipient::from(&UserContext::new("u-1").with_name("Ana").with_email("ana@uni.edu"))
    }

    #[test]
    fn test_far_due_date_caps_at_max_delay() {
        let scheduled = ReminderPolicy::default().schedule(&task_due_in(10), &recipient(), now());
        assert_eq!(scheduled.delay, Duration::from_secs(7 * DAY));
        assert_eq!(scheduled.clamp, DelayClamp::CappedAtMaximum);
    }

    #[test]
    fn test_delay_beyond_maximum_is_capped() {
        let scheduled = ReminderPolicy::default().schedule(&task_due_in(30), &recipient(), now());
        assert_eq!(scheduled.delay, Duration::from_secs(7 * DAY));
        assert_eq!(scheduled.clamp, DelayClamp::CappedAtMaximum);

        let (delay, clamp) = ReminderPolicy::default().visibility_delay(
            now() + chrono::Duration::days(10) - chrono::Duration::seconds(1),
            now(),
        );
        assert_eq!(delay, Duration::from_secs(7 * DAY - 1));
        assert_eq!(clamp, DelayClamp::Unclamped);
    }

    #[test]
    fn test_unrepresentable_reminder_time_uses_minimum() {
        let policy = ReminderPolicy::default();
        let (delay, clamp) = policy.visibility_delay(DateTime::<Utc>::MIN_UTC, now());
        assert_eq!(delay, policy.min_delay);
        assert_eq!(clamp, DelayClamp::RaisedToMinimum);

        let huge_lead = ReminderPolicy {
            lead_days: u32::MAX,
            ..Default::default()
        };
        let (delay, clamp) = huge_lead.visibility_delay(now(), now());
        assert_eq!(delay, policy.min_delay);
        assert_eq!(clamp, DelayClamp::RaisedToMinimum);
    }

    #[test]
    fn test_delay_is_due_minus_lead() {
        let scheduled = ReminderPolicy::default().schedule(&task_due_in(5), &recipient(), now());
        assert_eq!(scheduled.delay, Duration::from_secs(2 * DAY));
        assert_eq!(scheduled.clamp, DelayClamp::Unclamped);
    }

    #[test]
    fn test_due_inside_lead_time_uses_minimum() {
        let policy = ReminderPolicy::default();
        let scheduled = policy.schedule(&task_due_in(1), &recipient(), now());
        assert_eq!(scheduled.delay, policy.min_delay);
        assert_eq!(scheduled.clamp, DelayClamp::RaisedToMinimum);

        let (delay, _) = policy.visibility_delay(now() + chrono::Duration::days(3), now());
        assert_eq!(delay, policy.min_delay);
    }

    #[test]
    fn test_payload_is_independent_of_now() {
        let policy = ReminderPolicy::default();
        let task = task_due_in(10);
        let a = policy.schedule(&task, &recipient(), now());
        let b = policy.schedule(&task, &recipient(), now() + chrono::Duration::days(4));
        assert_eq!(a.payload, b.payload);
        assert_ne!(a.delay, b.delay);
    }

    #[test]
    fn test_payload_wire_format() {
        let scheduled = ReminderPolicy::default().schedule(&task_due_in(10), &recipient(), now());
        let json: serde_json::Value = serde_json::from_str(&scheduled.payload.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "deadline_reminder");
        assert_eq!(json["priority"], "urgent");
        assert_eq!(json["dueDate"], "2025-10-20T12:00:00Z");
        assert_eq!(json["email"], "ana@uni.edu");
        assert_eq!(json["name"], "Ana");
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_policy_validation() {
        assert!(ReminderPolicy::default().validate().is_ok());
        let zero_min = ReminderPolicy {
            min_delay: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero_min.validate().is_err());
        let inverted = ReminderPolicy {
            min_delay: Duration::from_secs(10 * DAY),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
        let long_lead = ReminderPolicy {
            lead_days: MAX_LEAD_DAYS + 1,
            ..Default::default()
        };
        assert!(long_lead.validate().is_err());
        let year_lead = ReminderPolicy {
            lead_days: MAX_LEAD_DAYS,
            ..Default::default()
        };
        assert!(year_lead.validate().is_ok());
    }
}
