//! Exponential-backoff policy for server availability probing.
//!
//! The wait after zero-based attempt `n` is `base_delay * 2^n`, clamped to
//! [`BackoffPolicy::max_delay`]. With the defaults this gives
//! 1, 2, 4, 8, 16, 30, 30, ... seconds.

use std::time::Duration;

/// Tunable parameters for probing a database server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Wait after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound on the wait between attempts.
    pub max_delay: Duration,
    /// Number of connection attempts before giving up.
    pub max_attempts: u32,
    /// Timeout applied to each individual connection attempt.
    pub connect_timeout: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 30,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl BackoffPolicy {
    /// Wait after the zero-based `attempt` failed.
    ///
    /// Saturates at `max_delay` instead of overflowing for large attempts.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Waits between consecutive attempts, in order.
    ///
    /// Yields `max_attempts - 1` values: no wait follows the final attempt.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts.saturating_sub(1)).map(|attempt| self.delay_for(attempt))
    }

    /// Total time spent sleeping if every attempt fails.
    pub fn total_wait(&self) -> Duration {
        self.schedule().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_from_base() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[test]
    fn delay_clamps_at_max() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(5), Duration::from_secs(30));
        assert_eq!(policy.delay_for(29), Duration::from_secs(30));
    }

    #[test]
    fn delay_saturates_for_huge_attempts() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(64), Duration::from_secs(30));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn full_backoff_sequence() {
        let policy = BackoffPolicy::default();
        let expected = [1, 2, 4, 8, 16, 30, 30, 30];

        for (attempt, &secs) in expected.iter().enumerate() {
            assert_eq!(policy.delay_for(attempt as u32).as_secs(), secs);
        }
    }

    #[test]
    fn schedule_is_non_decreasing_and_capped() {
        let policy = BackoffPolicy::default();
        let delays: Vec<Duration> = policy.schedule().collect();

        assert_eq!(delays.len(), 29);
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert!(delays.iter().all(|d| *d <= policy.max_delay));
    }

    #[test]
    fn total_wait_matches_default_budget() {
        // 1 + 2 + 4 + 8 + 16 for attempts 0..5, then 24 waits of 30s.
        let policy = BackoffPolicy::default();
        assert_eq!(policy.total_wait(), Duration::from_secs(31 + 24 * 30));
    }

    #[test]
    fn single_attempt_never_waits() {
        let policy = BackoffPolicy {
            max_attempts: 1,
            ..Default::default()
        };
        assert_eq!(policy.schedule().count(), 0);
    }

    #[test]
    fn zero_attempts_never_waits() {
        let policy = BackoffPolicy {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(policy.total_wait(), Duration::ZERO);
    }
}
