//! Resilience settings

use review_domain::{BreakerConfig, RetryPolicy};

/// Breaker thresholds plus the retry policy of each invocation mode
#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceSettings {
    pub breaker: BreakerConfig,
    /// Per-provider policy in fallback routing
    pub fallback: RetryPolicy,
    /// Per-provider policy in round-table querying
    pub round_table: RetryPolicy,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            breaker: BreakerConfig::default(),
            fallback: RetryPolicy::fallback_routing(),
            round_table: RetryPolicy::round_table(),
        }
    }
}
