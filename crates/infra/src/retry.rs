//! Retry policy: exponential backoff with jitter, bounded attempts.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use authmap_core::{DomainError, DomainResult};

/// Backoff configuration shared by the update cycle.
///
/// `max_attempts` bounds total tries **including the first**. Jitter scales
/// each delay by a uniform factor in `[0.5, 1.0]` so concurrent clients do
/// not retry in lockstep against the same resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
    pub backoff_factor: f64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Reject unusable configurations before the first fetch (fail-fast,
    /// never at retry time).
    pub fn validate(&self) -> DomainResult<()> {
        if self.max_attempts < 1 {
            return Err(DomainError::validation(
                "retry max attempts is invalid, must be greater than zero",
            ));
        }
        if self.min_delay > self.max_delay {
            return Err(DomainError::validation(
                "retry min delay exceeds max delay",
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 0.0 {
            return Err(DomainError::validation("retry backoff factor is invalid"));
        }
        Ok(())
    }

    /// Delay to wait before the retry following `attempt` (1-based).
    ///
    /// `min(max_delay, min_delay * backoff_factor^(attempt-1))`, then jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let scaled = self.min_delay.as_secs_f64() * self.backoff_factor.powi(exponent as i32);
        let capped = scaled.min(self.max_delay.as_secs_f64());

        let jittered = if self.jitter {
            capped * rand::rng().random_range(0.5..=1.0)
        } else {
            capped
        };

        Duration::from_secs_f64(jittered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            max_attempts: 4,
            backoff_factor: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn delay_doubles_per_attempt_without_jitter() {
        let policy = policy();
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn delay_is_capped_at_max() {
        let policy = policy();
        // 100ms * 2^9 = 51.2s, far past the 2s cap.
        assert_eq!(policy.delay_for(10), Duration::from_secs(2));
    }

    #[test]
    fn jitter_stays_within_half_to_full_delay() {
        let policy = RetryPolicy {
            jitter: true,
            ..policy()
        };

        for _ in 0..100 {
            let delay = policy.delay_for(3);
            assert!(delay >= Duration::from_millis(200), "delay {delay:?} below jitter floor");
            assert!(delay <= Duration::from_millis(400), "delay {delay:?} above base delay");
        }
    }

    #[test]
    fn zero_attempts_is_rejected_eagerly() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..policy()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn inverted_delay_bounds_are_rejected() {
        let policy = RetryPolicy {
            min_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(1),
            ..policy()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn non_positive_backoff_factor_is_rejected() {
        let policy = RetryPolicy {
            backoff_factor: 0.0,
            ..policy()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn defaults_match_documented_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_factor, 2.0);
        assert!(policy.jitter);
        assert!(policy.validate().is_ok());
    }
}
