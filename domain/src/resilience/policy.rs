//! Retry policy and breaker configuration

use super::category::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// How one call site retries a fallible operation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first (at least 1)
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retryable: HashSet<ErrorCategory>,
    /// Deadline for each individual attempt
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            retryable: Self::default_retryable(),
            attempt_timeout: Duration::from_secs(30),
        }
    }

    /// Tight budget used per provider in fallback routing
    pub fn fallback_routing() -> Self {
        Self::new(2)
    }

    /// Larger budget used per provider in round-table querying
    pub fn round_table() -> Self {
        Self::new(3)
            .with_base_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(10))
            .with_attempt_timeout(Duration::from_secs(60))
    }

    /// Single attempt, no retry
    pub fn once() -> Self {
        Self::new(1)
    }

    pub fn default_retryable() -> HashSet<ErrorCategory> {
        [
            ErrorCategory::Network,
            ErrorCategory::Timeout,
            ErrorCategory::RateLimit,
            ErrorCategory::ServerError,
            ErrorCategory::Validation,
        ]
        .into_iter()
        .collect()
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_retryable(mut self, categories: impl IntoIterator<Item = ErrorCategory>) -> Self {
        self.retryable = categories.into_iter().collect();
        self
    }

    /// Whether a failure of `category` may be retried after `retries_so_far`
    /// earlier retries of the same category
    pub fn should_retry(&self, category: ErrorCategory, retries_so_far: u32) -> bool {
        if category.is_never_retried() || !self.retryable.contains(&category) {
            return false;
        }
        category.retry_cap().is_none_or(|cap| retries_so_far < cap)
    }

    /// Backoff before retry number `retry` (0-based), scaled by `jitter`.
    ///
    /// `base * 2^retry * category multiplier`, capped at `max_delay`, then
    /// multiplied by `jitter` (expected in `0.5..=1.0`).
    pub fn backoff(&self, retry: u32, category: ErrorCategory, jitter: f64) -> Duration {
        let exp = 2u32.saturating_pow(retry.min(16));
        let ceiling = self
            .base_delay
            .saturating_mul(exp)
            .saturating_mul(category.backoff_multiplier())
            .min(self.max_delay);
        ceiling.mul_f64(jitter.clamp(0.0, 1.0))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fallback_routing()
    }
}

/// Per-target circuit breaker thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker
    pub failure_threshold: u32,
    /// Time an open breaker waits before allowing a probe
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Circuit breaker state for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let fallback = RetryPolicy::fallback_routing();
        assert_eq!(fallback.max_attempts, 2);
        let round_table = RetryPolicy::round_table();
        assert_eq!(round_table.max_attempts, 3);
        assert_eq!(round_table.base_delay, Duration::from_secs(1));
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
    }

    #[test]
    fn test_should_retry_caps() {
        let policy = RetryPolicy::new(5);
        assert!(policy.should_retry(ErrorCategory::Network, 3));
        assert!(policy.should_retry(ErrorCategory::Validation, 0));
        assert!(!policy.should_retry(ErrorCategory::Validation, 1));
        assert!(!policy.should_retry(ErrorCategory::Authentication, 0));
        assert!(!policy.should_retry(ErrorCategory::Fatal, 0));

        let narrow = RetryPolicy::new(5).with_retryable([ErrorCategory::Timeout]);
        assert!(!narrow.should_retry(ErrorCategory::Network, 0));
        // Policy cannot re-enable a never-retried category
        let wide = RetryPolicy::new(5).with_retryable(ErrorCategory::ALL);
        assert!(!wide.should_retry(ErrorCategory::Authentication, 0));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::new(5)
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(1000));
        assert_eq!(policy.backoff(0, ErrorCategory::Network, 1.0), Duration::from_millis(100));
        assert_eq!(policy.backoff(2, ErrorCategory::Network, 1.0), Duration::from_millis(400));
        assert_eq!(policy.backoff(10, ErrorCategory::Network, 1.0), Duration::from_millis(1000));
        assert_eq!(policy.backoff(1, ErrorCategory::Network, 0.5), Duration::from_millis(100));
    }

    #[test]
    fn test_rate_limit_doubles_backoff() {
        let policy = RetryPolicy::new(5)
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(10));
        assert_eq!(
            policy.backoff(1, ErrorCategory::RateLimit, 1.0),
            policy.backoff(1, ErrorCategory::ServerError, 1.0) * 2
        );
    }

    #[test]
    fn test_breaker_defaults() {
        let config = BreakerConfig::default();
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.cooldown, Duration::from_secs(60));
    }
}
