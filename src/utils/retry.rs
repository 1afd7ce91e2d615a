use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

// ============================================================================
// Bounded Retry for Outbound Integrations
// ============================================================================
//
// Transient failures are retried with exponential backoff. The whole attempt
// sequence is capped by a wall-clock window; permanent failures return at once.
//
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub multiplier: f64,
    /// Wall-clock budget for all attempts together
    pub window: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            window: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff. Used in tests and for callers that retry themselves.
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_millis(((delay.as_millis() as f64) * self.multiplier) as u64).min(self.max_delay)
    }
}

/// Result of a retried operation
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// Operation succeeded
    Success(T),
    /// Every attempt failed with a transient error; carries the last one
    Exhausted(E),
    /// Operation failed with an error that must not be retried
    Permanent(E),
    /// The retry window elapsed before the operation settled
    TimedOut,
}

/// Check if an error is transient (should retry) or permanent (should not retry)
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

/// Runs `operation` until it succeeds, fails permanently, runs out of
/// attempts, or the policy window elapses.
pub async fn retry_transient<F, Fut, T, E>(policy: &RetryPolicy, operation_name: &str, operation: F) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    match timeout(policy.window, attempt_loop(policy, operation_name, operation)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!(operation = operation_name, window_ms = policy.window.as_millis() as u64, "Retry window elapsed");
            RetryOutcome::TimedOut
        }
    }
}

async fn attempt_loop<F, Fut, T, E>(policy: &RetryPolicy, operation_name: &str, mut operation: F) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(operation = operation_name, attempt, "Operation succeeded after retry");
                }
                return RetryOutcome::Success(result);
            }
            Err(error) if !error.is_transient() => {
                tracing::warn!(operation = operation_name, error = %error, "Permanent failure, not retrying");
                return RetryOutcome::Permanent(error);
            }
            Err(error) if attempt >= policy.max_attempts => {
                tracing::error!(operation = operation_name, attempt, error = %error, "Operation failed after all retries");
                return RetryOutcome::Exhausted(error);
            }
            Err(error) => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "Transient failure, retrying after delay"
                );
                sleep(delay).await;
                delay = policy.next_delay(delay);
            }
        }
    }
}
