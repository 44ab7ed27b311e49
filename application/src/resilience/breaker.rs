//! Per-target circuit breakers
//!
//! One registry is shared process-wide by every executor. State for all
//! targets lives behind a single mutex so each transition is atomic
//! relative to concurrent attempts against the same target. The lock is
//! never held across an await.

use review_domain::{BreakerConfig, CircuitState, ErrorCategory};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
struct BreakerState {
    failure_streak: u32,
    open_until: Option<Instant>,
    /// Id of the half-open probe currently holding the slot
    probe: Option<u64>,
}

impl BreakerState {
    fn circuit_state(&self, now: Instant) -> CircuitState {
        match self.open_until {
            None => CircuitState::Closed,
            Some(until) if now < until => CircuitState::Open,
            Some(_) => CircuitState::HalfOpen,
        }
    }
}

/// A call refused by an open breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerRejection {
    /// Time until a probe will be allowed; zero while a probe is in flight
    pub retry_after: Duration,
}

/// Permission for one attempt, handed out by [`CircuitBreakerRegistry::try_acquire`].
///
/// A permit that holds the half-open probe slot gives it back when dropped,
/// so an attempt cancelled before it reports an outcome does not leave the
/// target waiting on a probe that will never finish.
#[must_use = "dropping the permit releases a half-open probe slot"]
#[derive(Debug)]
pub struct BreakerPermit<'a> {
    registry: &'a CircuitBreakerRegistry,
    target: String,
    probe: Option<u64>,
}

impl BreakerPermit<'_> {
    /// Whether this permit holds the half-open probe slot
    pub fn is_probe(&self) -> bool {
        self.probe.is_some()
    }
}

impl Drop for BreakerPermit<'_> {
    fn drop(&mut self) {
        let Some(id) = self.probe else {
            return;
        };
        let mut guard = self.registry.lock();
        if let Some(state) = guard.get_mut(&self.target)
            && state.probe == Some(id)
        {
            state.probe = None;
            debug!(endpoint = %self.target, "Half-open probe abandoned, slot released");
        }
    }
}

/// Point-in-time view of one target's breaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub target: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub retry_after: Option<Duration>,
}

pub struct CircuitBreakerRegistry {
    config: BreakerConfig,
    breakers: Mutex<HashMap<String, BreakerState>>,
    next_probe: Mutex<u64>,
}

impl std::fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CircuitBreakerRegistry {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            breakers: Mutex::new(HashMap::new()),
            next_probe: Mutex::new(0),
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, BreakerState>> {
        self.breakers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn probe_id(&self) -> u64 {
        let mut next = self.next_probe.lock().unwrap_or_else(PoisonError::into_inner);
        *next = next.wrapping_add(1);
        *next
    }

    /// Ask permission for one attempt against `target`.
    ///
    /// Closed: always allowed. Open: rejected until the cool-down elapses.
    /// Half-open: exactly one caller gets the probe, everyone else is
    /// rejected until that probe reports back or its permit is dropped.
    pub fn try_acquire(&self, target: &str) -> Result<BreakerPermit<'_>, BreakerRejection> {
        let now = Instant::now();
        let mut guard = self.lock();
        let state = guard.entry(target.to_string()).or_default();

        let probe = match state.circuit_state(now) {
            CircuitState::Closed => None,
            CircuitState::Open => {
                return Err(BreakerRejection {
                    retry_after: state
                        .open_until
                        .map(|until| until.saturating_duration_since(now))
                        .unwrap_or_default(),
                });
            }
            CircuitState::HalfOpen => {
                if state.probe.is_some() {
                    return Err(BreakerRejection {
                        retry_after: Duration::ZERO,
                    });
                }
                let id = self.probe_id();
                state.probe = Some(id);
                info!(endpoint = %target, "Circuit half-open, allowing probe");
                Some(id)
            }
        };

        Ok(BreakerPermit {
            registry: self,
            target: target.to_string(),
            probe,
        })
    }

    pub fn record_success(&self, target: &str) {
        let mut guard = self.lock();
        let state = guard.entry(target.to_string()).or_default();
        if state.open_until.is_some() {
            info!(endpoint = %target, "Circuit closed after successful probe");
        }
        *state = BreakerState::default();
    }

    pub fn record_failure(&self, target: &str, category: ErrorCategory) {
        let now = Instant::now();
        let mut guard = self.lock();
        let state = guard.entry(target.to_string()).or_default();

        if !category.counts_toward_breaker() {
            // Release the probe slot without judging the target
            state.probe = None;
            return;
        }

        let was_half_open = state.circuit_state(now) == CircuitState::HalfOpen;
        state.failure_streak = state.failure_streak.saturating_add(1);
        state.probe = None;

        if was_half_open || state.failure_streak >= self.config.failure_threshold.max(1) {
            state.open_until = Some(now + self.config.cooldown);
            warn!(
                endpoint = %target,
                failures = state.failure_streak,
                category = %category,
                "Circuit opened for {:?}",
                self.config.cooldown
            );
        }
    }

    pub fn state(&self, target: &str) -> CircuitState {
        self.lock()
            .get(target)
            .map(|s| s.circuit_state(Instant::now()))
            .unwrap_or(CircuitState::Closed)
    }

    /// Every known target, sorted by name
    pub fn snapshot(&self) -> Vec<BreakerSnapshot> {
        let now = Instant::now();
        let guard = self.lock();
        let mut snapshots: Vec<_> = guard
            .iter()
            .map(|(target, s)| BreakerSnapshot {
                target: target.clone(),
                state: s.circuit_state(now),
                consecutive_failures: s.failure_streak,
                retry_after: s
                    .open_until
                    .filter(|until| now < *until)
                    .map(|until| until - now),
            })
            .collect();
        snapshots.sort_by(|a, b| a.target.cmp(&b.target));
        snapshots
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail_n(registry: &CircuitBreakerRegistry, target: &str, n: u32) {
        for _ in 0..n {
            let _permit = registry.try_acquire(target).unwrap();
            registry.record_failure(target, ErrorCategory::ServerError);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_after_threshold() {
        let registry = CircuitBreakerRegistry::default();
        fail_n(&registry, "openai", 4);
        assert_eq!(registry.state("openai"), CircuitState::Closed);
        fail_n(&registry, "openai", 1);
        assert_eq!(registry.state("openai"), CircuitState::Open);

        let rejection = registry.try_acquire("openai").unwrap_err();
        assert_eq!(rejection.retry_after, Duration::from_secs(60));
        // Other targets are unaffected
        assert!(registry.try_acquire("anthropic").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_allows_exactly_one_probe() {
        let registry = CircuitBreakerRegistry::default();
        fail_n(&registry, "t", 5);
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(registry.state("t"), CircuitState::HalfOpen);

        let probe = registry.try_acquire("t").unwrap();
        assert!(probe.is_probe());
        assert!(registry.try_acquire("t").is_err());

        registry.record_success("t");
        drop(probe);
        assert_eq!(registry.state("t"), CircuitState::Closed);
        assert!(registry.try_acquire("t").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_probe_reopens() {
        let registry = CircuitBreakerRegistry::default();
        fail_n(&registry, "t", 5);
        tokio::time::advance(Duration::from_secs(61)).await;
        let _probe = registry.try_acquire("t").unwrap();
        registry.record_failure("t", ErrorCategory::Timeout);
        assert_eq!(registry.state("t"), CircuitState::Open);
        let rejection = registry.try_acquire("t").unwrap_err();
        assert_eq!(rejection.retry_after, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_probe_frees_the_slot() {
        let registry = CircuitBreakerRegistry::default();
        fail_n(&registry, "t", 5);
        tokio::time::advance(Duration::from_secs(60)).await;

        let probe = registry.try_acquire("t").unwrap();
        assert!(registry.try_acquire("t").is_err());
        drop(probe);

        // Still half-open, and a new probe is admitted
        assert_eq!(registry.state("t"), CircuitState::HalfOpen);
        let next = registry.try_acquire("t").unwrap();
        assert!(next.is_probe());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_permit_does_not_free_a_newer_probe() {
        let registry = CircuitBreakerRegistry::default();
        fail_n(&registry, "t", 5);
        tokio::time::advance(Duration::from_secs(60)).await;

        let first = registry.try_acquire("t").unwrap();
        // Validation outcome releases the slot without closing the circuit
        registry.record_failure("t", ErrorCategory::Validation);
        let second = registry.try_acquire("t").unwrap();
        drop(first);
        assert!(registry.try_acquire("t").is_err());
        drop(second);
        assert!(registry.try_acquire("t").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_failures_do_not_count() {
        let registry = CircuitBreakerRegistry::default();
        for _ in 0..10 {
            registry.record_failure("t", ErrorCategory::Validation);
        }
        assert_eq!(registry.state("t"), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_streak() {
        let registry = CircuitBreakerRegistry::default();
        fail_n(&registry, "t", 4);
        registry.record_success("t");
        fail_n(&registry, "t", 4);
        assert_eq!(registry.state("t"), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_open_targets() {
        let registry = CircuitBreakerRegistry::new(BreakerConfig {
            failure_threshold: 2,
            cooldown: Duration::from_secs(30),
        });
        fail_n(&registry, "b", 2);
        fail_n(&registry, "a", 1);
        tokio::time::advance(Duration::from_secs(10)).await;

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].target, "a");
        assert_eq!(snapshot[0].state, CircuitState::Closed);
        assert_eq!(snapshot[0].consecutive_failures, 1);
        assert_eq!(snapshot[1].state, CircuitState::Open);
        assert_eq!(snapshot[1].retry_after, Some(Duration::from_secs(20)));
    }
}
