//! Exponential backoff between message generation attempts.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::debug;

const INITIAL_INTERVAL_MILLIS: u64 = 500;
const MAX_INTERVAL_SECS: u64 = 5;

fn new_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_millis(INITIAL_INTERVAL_MILLIS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `max_attempts` times (at least once) and receives
/// the 1-based attempt number. Between failures the task sleeps for an
/// increasing interval. `wrap_exhausted` converts the last error into the
/// caller's "retries exhausted" variant.
pub async fn retry_with_backoff<T, E, Fut, F, W>(
    max_attempts: u32,
    mut attempt: F,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    W: FnOnce(E) -> E,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut backoff = new_backoff();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match attempt(attempts).await {
            Ok(value) => return Ok(value),
            Err(e) if attempts >= max_attempts => return Err(wrap_exhausted(e)),
            Err(e) => {
                debug!("Attempt {}/{} failed: {}", attempts, max_attempts, e);
                if let Some(wait_duration) = backoff.next_backoff() {
                    tokio::time::sleep(wait_duration).await;
                }
            }
        }
    }
}
