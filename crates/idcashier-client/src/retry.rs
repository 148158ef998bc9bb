//! # Bounded Retry
//!
//! Re-runs a whole async operation until it succeeds, the error is not
//! worth retrying, or the attempt budget is spent.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attempt 1 ──✗──► sleep 1s ──► attempt 2 ──✗──► sleep 2s ──► attempt 3 │
//! │            ──✗──► sleep 4s ──► attempt 4 ──✗──► RetryExhausted{4, err}  │
//! │                                                                         │
//! │  non-retryable error at any attempt ──► RetryExhausted{n, err} at once │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The intervals come from `backoff::ExponentialBackoff` with jitter turned
//! off; the attempt count comes from [`RetryPolicy`]. No partial result is
//! carried between attempts.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use idcashier_core::RetryPolicy;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// The last error and how many attempts were made.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gave up after {} attempt(s): {}", self.attempts, self.last_error)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryExhausted<E> {}

/// Deterministic exponential intervals for a policy.
pub fn backoff_for(policy: &RetryPolicy) -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: policy.base_delay,
        current_interval: policy.base_delay,
        randomization_factor: 0.0,
        multiplier: 2.0,
        max_interval: Duration::from_secs(60),
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Runs `op` under `policy`, retrying while `should_retry(&err)` holds.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    should_retry: R,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: fmt::Display,
{
    let mut intervals = backoff_for(policy);
    let mut attempt = 0u32;

    loop {
        debug!(attempt = attempt + 1, max = policy.max_attempts(), "attempt");
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let attempts = attempt + 1;
                if !should_retry(&err) || !policy.should_retry(attempt) {
                    return Err(RetryExhausted {
                        attempts,
                        last_error: err,
                    });
                }

                let delay = intervals
                    .next_backoff()
                    .unwrap_or_else(|| policy.delay_for(attempt));
                warn!(attempt = attempts, delay_ms = delay.as_millis() as u64, error = %err, "Attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum Failure {
        Transient,
        Fatal,
    }

    impl fmt::Display for Failure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn transient(e: &Failure) -> bool {
        *e == Failure::Transient
    }

    #[test]
    fn test_backoff_intervals_follow_policy() {
        let mut b = backoff_for(&RetryPolicy::default());
        let secs: Vec<u64> = (0..3).map(|_| b.next_backoff().unwrap().as_secs()).collect();
        assert_eq!(secs, vec![1, 2, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_attempts_with_doubling_delays() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let counter = calls.clone();
        let result: Result<(), _> = retry_with_backoff(&RetryPolicy::default(), transient, move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Failure::Transient)
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 4);
        assert_eq!(err.last_error, Failure::Transient);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(7));
        assert!(waited < Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let result = retry_with_backoff(&RetryPolicy::default(), transient, |attempt| async move {
            if attempt < 2 {
                Err(Failure::Transient)
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried() {
        let start = Instant::now();
        let result: Result<(), _> =
            retry_with_backoff(&RetryPolicy::default(), transient, |_| async { Err(Failure::Fatal) }).await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_no_retry_policy() {
        let result: Result<(), _> =
            retry_with_backoff(&RetryPolicy::none(), transient, |_| async { Err(Failure::Transient) }).await;
        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(
            RetryExhausted {
                attempts: 4,
                last_error: Failure::Fatal
            }
            .to_string(),
            "gave up after 4 attempt(s): Fatal"
        );
    }
}
