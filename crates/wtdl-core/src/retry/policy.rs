use std::time::Duration;

use crate::config::DownloaderConfig;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Budget spent; give up.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Pure exponential backoff with a fixed retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = max_retries + 1).
    pub max_retries: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DownloaderConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &DownloaderConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: cfg.retry_delay(),
        }
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Decide what to do after attempt `attempt` (0-based) failed.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(backoff_delay(self.base_delay, attempt))
    }
}

/// `base * 2^attempt`, saturating instead of overflowing.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let multiplier = 2u32.saturating_pow(attempt);
    base.saturating_mul(multiplier)
}
