//! Retry decision logic for external lookups
//!
//! [`RetryPolicy`] is a pure state machine: given a classified failure it
//! decides whether to retry, how long to wait, and when to treat the failure
//! as terminal. It never sleeps and never touches a clock on its own — the
//! caller passes instants in — so the whole protocol is unit-testable
//! without wall time.
//!
//! Two distinct retry tracks exist:
//! - **Rate-limited** failures wait until the limiter resets and do not
//!   consume retry attempts; only the optional cumulative wait budget bounds
//!   them.
//! - **Access-denied** failures (possibly secondary rate limiting) retry with
//!   exponential backoff up to `max_retries` attempts.
//!
//! Everything else is terminal for the affected entry.

use crate::config::RetryConfig;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

/// Outcome of consulting the policy after a failed lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given duration, then retry. Consumes one retry attempt.
    Backoff(Duration),

    /// Wait until the rate limiter resets, then retry. Does not consume an
    /// attempt; the caller computes the actual wait via
    /// [`RetryPolicy::reset_wait`].
    WaitForReset,

    /// Stop retrying; the fetch degrades to an empty result.
    GiveUp,
}

/// Per-fetch retry state
///
/// Owns the attempt counter and the cumulative rate-limit wait for one
/// entry's lookup. Created fresh for every fetch and discarded on
/// completion.
#[derive(Debug)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    jitter: bool,
    min_reset_wait: Duration,
    reset_wait_buffer: Duration,
    reset_wait_budget: Option<Duration>,
    attempt: u32,
    reset_waited: Duration,
}

impl RetryPolicy {
    /// Create a fresh policy from the retry configuration
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.base_delay,
            jitter: config.jitter,
            min_reset_wait: config.min_reset_wait,
            reset_wait_buffer: config.reset_wait_buffer,
            reset_wait_budget: config.reset_wait_budget,
            attempt: 0,
            reset_waited: Duration::ZERO,
        }
    }

    /// Decide what to do about a classified failure
    pub fn decide(&mut self, error: &ApiError) -> RetryDecision {
        match error {
            ApiError::RateLimited { .. } => {
                if let Some(budget) = self.reset_wait_budget
                    && self.reset_waited >= budget
                {
                    return RetryDecision::GiveUp;
                }
                RetryDecision::WaitForReset
            }
            ApiError::Forbidden { .. } => {
                if self.attempt >= self.max_retries {
                    return RetryDecision::GiveUp;
                }
                let delay = backoff_delay(self.base_delay, self.attempt);
                self.attempt += 1;
                let delay = if self.jitter { add_jitter(delay) } else { delay };
                RetryDecision::Backoff(delay)
            }
            // NotFound is permanent; Status/Network/Decode are unclassified
            // and treated as permanent for this entry
            _ => RetryDecision::GiveUp,
        }
    }

    /// Compute how long to wait for the rate limiter to reset
    ///
    /// The wait is `max(reset − now, min_reset_wait) + reset_wait_buffer`.
    /// An unknown or already-past reset instant waits the minimum. The wait
    /// is recorded against the cumulative budget.
    pub fn reset_wait(&mut self, reset: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
        let until_reset = reset
            .and_then(|r| (r - now).to_std().ok())
            .unwrap_or(Duration::ZERO);
        let wait = until_reset.max(self.min_reset_wait) + self.reset_wait_buffer;
        self.reset_waited = self.reset_waited.saturating_add(wait);
        wait
    }

    /// Number of backoff retry attempts consumed so far
    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

/// Exponential backoff delay for the given zero-based attempt
///
/// `base * 2^attempt`, saturating at `Duration::MAX` rather than wrapping.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    2u32.checked_pow(attempt)
        .and_then(|factor| base.checked_mul(factor))
        .unwrap_or(Duration::MAX)
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
