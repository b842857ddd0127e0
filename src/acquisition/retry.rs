use std::time::Duration;

use crate::config;

/// What to do after a failed attempt on a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given duration, then attempt the same strategy again.
    Wait(Duration),
    /// The strategy is exhausted, move on to the next one in the chain.
    GiveUp,
}

/// Linear backoff applied to each strategy independently.
///
/// A strategy gets at most `max_attempts` attempts. After the n-th failed
/// attempt the policy waits `n * base_delay`, except after the last one where
/// it gives up straight away.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: config::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(config::DEFAULT_BASE_DELAY_MS),
            request_timeout: Duration::from_millis(config::DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_env() -> Self {
        Self {
            max_attempts: config::max_retries(),
            base_delay: config::base_delay(),
            request_timeout: config::request_timeout(),
        }
    }

    /// `attempt` is the 1-based number of the attempt that just failed.
    pub fn after_failure(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        RetryDecision::Wait(self.base_delay.saturating_mul(attempt))
    }

    /// Upper bound of attempts a single track can cost over a chain.
    pub fn attempt_budget(&self, strategies: usize) -> u32 {
        self.max_attempts * strategies as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_grow_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.after_failure(1),
            RetryDecision::Wait(Duration::from_millis(2000))
        );
        assert_eq!(
            policy.after_failure(2),
            RetryDecision::Wait(Duration::from_millis(4000))
        );
    }

    #[test]
    fn gives_up_after_last_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.after_failure(3), RetryDecision::GiveUp);
        assert_eq!(policy.after_failure(7), RetryDecision::GiveUp);
    }

    #[test]
    fn single_attempt_policy_never_waits() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.after_failure(1), RetryDecision::GiveUp);
        assert_eq!(policy.attempt_budget(3), 3);
    }

    #[test]
    fn huge_base_delay_saturates() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::MAX,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.after_failure(3), RetryDecision::Wait(Duration::MAX));
    }
}
