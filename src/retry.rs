//! Bounded retry with linear backoff.
//!
//! Both network stages (query fetch and sheet write) go through `retry`. Only
//! errors with `SyncError::is_retryable` are attempted again.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Result, SyncError};

/// Default attempt ceiling for both fetch and write.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Backoff step for query fetches (10s, 20s, 30s, 40s).
pub const FETCH_BACKOFF_STEP: Duration = Duration::from_secs(10);

/// Backoff step for sheet writes (15s, 30s, 45s, 60s).
pub const WRITE_BACKOFF_STEP: Duration = Duration::from_secs(15);

/// Attempt ceiling and backoff step for one retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait after attempt `n` is `backoff_step * n`.
    pub backoff_step: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given ceiling and step.
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts,
            backoff_step,
        }
    }

    /// Policy used for query fetches.
    pub fn fetch() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, FETCH_BACKOFF_STEP)
    }

    /// Policy used for sheet writes.
    pub fn write() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, WRITE_BACKOFF_STEP)
    }

    /// Delay inserted after the given (1-based) failed attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// Suspends the current run between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempt ceiling is reached.
///
/// `op` receives the 1-based attempt number. The last error is returned
/// unchanged once attempts are exhausted.
pub async fn retry<T, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut op: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error: Option<SyncError> = None;

    for attempt in 1..=max_attempts {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("[{}] Attempt {} failed: {}", label, attempt, e);

                if !e.is_retryable() {
                    return Err(e);
                }
                last_error = Some(e);

                if attempt < max_attempts {
                    let wait = policy.backoff_for(attempt);
                    info!("[{}] Retrying in {}s...", label, wait.as_secs());
                    sleeper.sleep(wait).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| SyncError::internal(format!("{label}: no attempt was made"))))
}
