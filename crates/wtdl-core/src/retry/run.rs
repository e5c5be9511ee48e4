//! Retry loop: run an async attempt until success or the policy says stop.

use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::policy::{RetryDecision, RetryPolicy};

/// Why the retry loop ended without a success.
#[derive(Debug)]
pub enum RetryError<E> {
    /// All attempts failed; `last` is the final attempt's error.
    Exhausted { retries: u32, last: E },
    /// The cancellation token fired during an attempt or a backoff sleep.
    Cancelled,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted { retries, last } => {
                write!(f, "gave up after {} retries: {}", retries, last)
            }
            RetryError::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Runs `attempt_fn(attempt)` for attempts `0..=policy.max_retries`, sleeping
/// `base * 2^attempt` after each failure that still has budget left.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    cancel: Option<&CancellationToken>,
    mut attempt_fn: F,
) -> Result<T, RetryError<E>>
where
    E: fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match attempt_fn(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if cancel.is_some_and(|c| c.is_cancelled()) {
                    return Err(RetryError::Cancelled);
                }
                match policy.decide(attempt) {
                    RetryDecision::NoRetry => {
                        return Err(RetryError::Exhausted {
                            retries: attempt,
                            last: e,
                        });
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = d.as_millis() as u64,
                            "attempt failed, retrying: {}",
                            e
                        );
                        sleep_or_cancel(d, cancel).await?;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

async fn sleep_or_cancel<E>(
    delay: std::time::Duration,
    cancel: Option<&CancellationToken>,
) -> Result<(), RetryError<E>> {
    match cancel {
        Some(token) => tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = token.cancelled() => Err(RetryError::Cancelled),
        },
        None => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}
