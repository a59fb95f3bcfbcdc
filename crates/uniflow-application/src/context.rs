//! Per-request cancellation and deadlines

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::errors::{ApplicationError, ApplicationResult};

/// Cancellation signal plus an optional caller-supplied timeout
///
/// Cloning shares the same signal.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tie the request to an existing token, e.g. a server shutdown token's child
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            timeout: None,
        }
    }

    /// Bound every storage call by `timeout` instead of the service default
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fail fast if the request was already cancelled
    pub fn check(&self) -> ApplicationResult<()> {
        if self.token.is_cancelled() {
            Err(ApplicationError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run `fut` unless cancelled, bounded by the request or default timeout
    ///
    /// `fut` is never polled when the request is already cancelled.
    pub async fn run<T, F>(
        &self,
        operation: &'static str,
        default_timeout: Duration,
        fut: F,
    ) -> ApplicationResult<T>
    where
        F: Future<Output = ApplicationResult<T>>,
    {
        self.check()?;
        let limit = self.timeout.unwrap_or(default_timeout);

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ApplicationError::Cancelled),
            outcome = tokio::time::timeout(limit, fut) => match outcome {
                Ok(result) => result,
                Err(_) => Err(ApplicationError::Timeout { operation }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = RequestContext::new();
        let value = ctx
            .run("read", Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_context_never_polls() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let polled = std::sync::atomic::AtomicBool::new(false);
        let result: ApplicationResult<()> = ctx
            .run("write", Duration::from_secs(1), async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert_eq!(result, Err(ApplicationError::Cancelled));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported_with_operation() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(50));
        let result: ApplicationResult<()> = ctx
            .run("find", Duration::from_secs(10), async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(ApplicationError::Timeout { operation: "find" }));
    }

    #[tokio::test]
    async fn test_cancel_during_run() {
        let ctx = RequestContext::new();
        let canceller = ctx.clone();
        let result: ApplicationResult<()> = ctx
            .run("find", Duration::from_secs(10), async move {
                canceller.cancel();
                std::future::pending::<()>().await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(ApplicationError::Cancelled));
    }
}
