//! Bounded exponential-backoff retry for the completion client.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;

/// Total attempts per logical request. Retrying beyond this is the caller's
/// problem, not ours.
pub const MAX_ATTEMPTS: u32 = 3;

const INITIAL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_INTERVAL: Duration = Duration::from_secs(30);

/// Run `attempt` up to [`MAX_ATTEMPTS`] times, sleeping an exponentially
/// increasing interval between failures. If every attempt fails, the last
/// error is handed to `wrap_exhausted` so the caller's error type can mark it
/// as final.
pub async fn retry_with_backoff<T, E, Fut, F, W>(mut attempt: F, wrap_exhausted: W) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    W: FnOnce(E) -> E,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: INITIAL_INTERVAL,
        max_interval: MAX_INTERVAL,
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut last_error = None;

    for attempts_left in (0..MAX_ATTEMPTS).rev() {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                last_error = Some(e);
                if attempts_left > 0
                    && let Some(wait) = backoff.next_backoff()
                {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    Err(wrap_exhausted(
        last_error.expect("at least one attempt must have run"),
    ))
}
