//! Retry limits for GitHub reads during the backfill.
//!
//! Rate-limited responses wait for the quota reset; other failures use a
//! short fixed delay. Both loops are bounded.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Rate-limited responses allowed per row; the last one fails the row.
pub const MAX_RATE_LIMIT_ATTEMPTS: u32 = 3;
/// Retries after a transient failure before giving up.
pub const MAX_TRANSIENT_RETRIES: u32 = 2;
pub const TRANSIENT_RETRY_DELAY: Duration = Duration::from_secs(2);
/// Assumed time to reset when GitHub omits `x-ratelimit-reset`.
pub const RATE_LIMIT_FALLBACK: Duration = Duration::from_secs(60);
/// Slack added past the reset time.
pub const RATE_LIMIT_GRACE: Duration = Duration::from_secs(5);
pub const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_rate_limit_attempts: u32,
    pub max_transient_retries: u32,
    pub transient_delay: Duration,
    pub rate_limit_fallback: Duration,
    pub rate_limit_grace: Duration,
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_attempts: MAX_RATE_LIMIT_ATTEMPTS,
            max_transient_retries: MAX_TRANSIENT_RETRIES,
            transient_delay: TRANSIENT_RETRY_DELAY,
            rate_limit_fallback: RATE_LIMIT_FALLBACK,
            rate_limit_grace: RATE_LIMIT_GRACE,
            max_rate_limit_wait: MAX_RATE_LIMIT_WAIT,
        }
    }
}

impl RetryPolicy {
    /// How long to sleep after a rate-limited response.
    ///
    /// Waits until `reset_at` plus the grace period, capped at
    /// `max_rate_limit_wait`. A reset already in the past waits only what is
    /// left of the grace period, or nothing.
    pub fn rate_limit_wait(&self, reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
        let fallback = chrono::Duration::from_std(self.rate_limit_fallback)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));
        let grace = chrono::Duration::from_std(self.rate_limit_grace)
            .unwrap_or_else(|_| chrono::Duration::zero());

        let reset_at = reset_at.unwrap_or(now + fallback);
        let wait = (reset_at + grace - now).to_std().unwrap_or(Duration::ZERO);

        wait.min(self.max_rate_limit_wait)
    }
}
