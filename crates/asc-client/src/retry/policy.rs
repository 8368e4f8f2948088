//! Retry policy: attempt budget and backoff schedule.

use std::time::Duration;

use rand::Rng;
use thiserror::Error;

/// Rejected policy values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvalidRetryPolicy {
    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    #[error("jitter fraction must be within [0, 1], got {0}")]
    JitterOutOfRange(f64),

    #[error("base delay {base:?} exceeds max delay {max:?}")]
    BaseExceedsMax { base: Duration, max: Duration },
}

/// Immutable retry configuration, resolved once per command invocation.
///
/// Attempt `n` (1-based) that fails retryably is followed by a wait of
/// `min(base_delay * 2^(n-1), max_delay)` plus up to `jitter_fraction` of
/// that value, chosen uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter_fraction: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter_fraction: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt budget and delays, default jitter.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            ..Self::default()
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Set the total number of attempts, first attempt included.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay before the first retry.
    #[must_use]
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the cap on any single backoff delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the jitter fraction (0 disables jitter).
    #[must_use]
    pub const fn with_jitter_fraction(mut self, fraction: f64) -> Self {
        self.jitter_fraction = fraction;
        self
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub const fn jitter_fraction(&self) -> f64 {
        self.jitter_fraction
    }

    /// Check the policy invariants.
    pub fn validate(&self) -> Result<(), InvalidRetryPolicy> {
        if self.max_attempts == 0 {
            return Err(InvalidRetryPolicy::ZeroAttempts);
        }
        if !(0.0..=1.0).contains(&self.jitter_fraction) {
            return Err(InvalidRetryPolicy::JitterOutOfRange(self.jitter_fraction));
        }
        if self.base_delay > self.max_delay {
            return Err(InvalidRetryPolicy::BaseExceedsMax {
                base: self.base_delay,
                max: self.max_delay,
            });
        }
        Ok(())
    }

    /// Capped exponential delay after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        2u32.checked_pow(exponent)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Backoff plus jitter, with `unit` in `[0, 1]` selecting the jitter share.
    pub fn delay_with_jitter(&self, attempt: u32, unit: f64) -> Duration {
        let backoff = self.backoff(attempt);
        let share = (self.jitter_fraction * unit).clamp(0.0, 1.0);
        // Near Duration::MAX the f64 product can round past what fits; saturate.
        let jitter = Duration::try_from_secs_f64(backoff.as_secs_f64() * share).unwrap_or(backoff);
        backoff.saturating_add(jitter)
    }

    /// Backoff plus uniformly random jitter.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let unit = rand::thread_rng().gen_range(0.0..=1.0);
        self.delay_with_jitter(attempt, unit)
    }
}
