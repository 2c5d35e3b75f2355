use std::future::Future;
use std::time::Duration;

use tracing::{debug, error};

use crate::error::UpstreamError;

/// Bounded retry with exponential backoff and no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay slept before retry `retry` (1-indexed): `base_delay * 2^(retry - 1)`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Receives every failed attempt before the retry decision is made.
pub trait AttemptObserver: Send + Sync {
    fn attempt_failed(&self, attempt: u32, max_attempts: u32, error: &UpstreamError);
}

#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    operation: &'static str,
}

impl TracingObserver {
    pub fn new(operation: &'static str) -> Self {
        Self { operation }
    }
}

impl AttemptObserver for TracingObserver {
    fn attempt_failed(&self, attempt: u32, max_attempts: u32, error: &UpstreamError) {
        error!(
            operation = self.operation,
            attempt,
            max_attempts,
            error = %error,
            "API request failed (attempt {}/{})",
            attempt,
            max_attempts
        );
    }
}

#[derive(Debug)]
pub struct RetryError {
    /// Attempts actually made, including the last failed one.
    pub attempts: u32,
    pub last: UpstreamError,
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or the
/// policy's attempts are used up.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    observer: &dyn AttemptObserver,
    mut operation: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                observer.attempt_failed(attempt, policy.max_attempts, &err);

                if attempt >= policy.max_attempts || !err.is_transient() {
                    return Err(RetryError {
                        attempts: attempt,
                        last: err,
                    });
                }

                let delay = policy.backoff(attempt);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient error"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
