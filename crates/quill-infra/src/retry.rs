//! Bounded retry with exponential backoff for transient store failures.

use std::future::Future;
use std::time::Duration;

use quill_core::ContentError;

/// Retry policy applied at the repository boundary.
///
/// Only `Timeout` and `StorageUnavailable` are retried; business outcomes
/// are deterministic and surface immediately. Callers cap non-idempotent
/// operations (counter increments) at two attempts total, since a naive
/// multi-retry of an increment would double-count.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts for idempotent operations, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub fn from_env() -> Self {
        Self {
            max_attempts: std::env::var("STORE_RETRY_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            base_delay: Duration::from_millis(
                std::env::var("STORE_RETRY_BASE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(50),
            ),
        }
    }

    fn delay(&self, retry_index: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry_index)
    }
}

/// Run `op`, retrying transient failures up to `max_attempts` total tries.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    max_attempts: u32,
    op_name: &'static str,
    op: F,
) -> Result<T, ContentError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ContentError>>,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt + 1 < attempts => {
                tracing::warn!(
                    operation = op_name,
                    attempt = attempt + 1,
                    error = %err,
                    "Transient store failure, retrying"
                );
                tokio::time::sleep(policy.delay(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
