//! Retry and backoff policy for the direct-link exchange.
//!
//! Every attempt failure is retried until the policy's budget is spent; the
//! delay before retry `n` (0-based) is `base_delay * 2^n` with no jitter and no
//! upper cap.

mod policy;
mod run;

pub use policy::{backoff_delay, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryError};
