//! Retry with exponential backoff.
//!
//! Used around the source connection (whole pipeline runs) and around bulk
//! requests. The schedule never runs out by default: a failing collaborator
//! is waited for until it comes back.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;
use tracing::error;

/// Default first wait.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Default ceiling for a single wait.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Exponential backoff parameters: waits of `base_delay`, then doubling,
/// each capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
        }
    }

    /// Unbounded sequence of waits for this policy.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> {
        let base_ms = self.base_delay.as_millis().max(1) as u64;
        let first = self.base_delay.min(self.max_delay);

        // `from_millis(2).factor(b)` yields 2b, 4b, 8b, ...
        let rest = ExponentialBackoff::from_millis(2)
            .factor(base_ms)
            .max_delay(self.max_delay);

        std::iter::once(first).chain(rest)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}

/// Logs a wait at error level. The default `on_retry` observer.
pub fn log_backoff<E: fmt::Display>(tries: usize, wait: Duration, err: &E) {
    error!(
        error = %err,
        "Backing off {:.1} seconds after {} tries",
        wait.as_secs_f64(),
        tries
    );
}

/// Runs `operation` until it succeeds, fails with an error `is_retryable`
/// rejects, or `schedule` runs out.
///
/// Before every wait `on_retry` receives the number of attempts made so
/// far, the upcoming wait and the error that caused it. When the schedule
/// runs out the last error is returned.
pub async fn retry_with_backoff<S, P, O, Op, Fut, T, E>(
    schedule: S,
    is_retryable: P,
    mut on_retry: O,
    mut operation: Op,
) -> Result<T, E>
where
    S: IntoIterator<Item = Duration>,
    P: Fn(&E) -> bool,
    O: FnMut(usize, Duration, &E),
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delays = schedule.into_iter();
    let mut tries = 0;

    loop {
        tries += 1;
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retryable(&err) {
            return Err(err);
        }

        match delays.next() {
            Some(wait) => {
                on_retry(tries, wait, &err);
                tokio::time::sleep(wait).await;
            }
            None => return Err(err),
        }
    }
}
