//! Retry logic.
//!
//! # Responsibilities
//! - Run one backend invocation up to `max_attempts` times
//! - Sleep with exponential backoff between tries
//! - Report how many tries were spent, for diagnostics
//!
//! # Design Decisions
//! - Tries are strictly sequential; the backoff elapses before the next one
//! - Every error is retryable here; the orchestrator decides what happens
//!   once tries are exhausted

use std::future::Future;
use std::time::Duration;

use crate::config::ResilienceConfig;
use crate::resilience::backoff::calculate_backoff;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, first one included. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &ResilienceConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Delay after failed try `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.initial_delay.as_millis() as u64,
            self.max_delay.as_millis() as u64,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ResilienceConfig::default())
    }
}

/// Result of a retried operation plus the number of tries it took.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    pub tries: u32,
}

/// Run `operation` until it succeeds or the policy's tries are exhausted.
///
/// The closure receives the 1-based try number. On exhaustion the last
/// error is returned.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation(attempt).await {
            Ok(value) => {
                return RetryOutcome {
                    result: Ok(value),
                    tries: attempt,
                }
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::info!(attempt, delay = ?delay, error = %e, "Retrying after failure");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Retries exhausted");
                return RetryOutcome {
                    result: Err(e),
                    tries: attempt,
                };
            }
        }
    }
}
