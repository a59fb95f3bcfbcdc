//! Outbound ports used by application services

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Failure reported by a message queue
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue unavailable: {0}")]
    Unavailable(String),

    #[error("Message rejected: {0}")]
    Rejected(String),
}

/// Sink for deferred reminder messages
///
/// Injected optionally at service construction; a service without one
/// simply skips reminders.
#[async_trait]
pub trait ReminderQueue: Send + Sync {
    /// Enqueue `message`, invisible to consumers for `visibility_delay`
    async fn enqueue(&self, message: String, visibility_delay: Duration) -> Result<(), QueueError>;
}

/// A message accepted by [`InMemoryReminderQueue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub body: String,
    pub visibility_delay: Duration,
}

/// Queue that records messages, for tests and local runs
#[derive(Debug, Default)]
pub struct InMemoryReminderQueue {
    messages: Mutex<Vec<QueuedMessage>>,
}

impl InMemoryReminderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of accepted messages in arrival order
    pub fn messages(&self) -> Vec<QueuedMessage> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

#[async_trait]
impl ReminderQueue for InMemoryReminderQueue {
    async fn enqueue(&self, message: String, visibility_delay: Duration) -> Result<(), QueueError> {
        self.messages.lock().push(QueuedMessage {
            body: message,
            visibility_delay,
        });
        Ok(())
    }
}
