//! Resilience layer
//!
//! Every outbound call goes through the [`ResilienceExecutor`]: classified
//! errors are retried with jittered exponential backoff, each target is
//! guarded by its own circuit breaker, and an ordered fallback chain can be
//! tried when a primary exhausts its budget.
//!
//! ```text
//!            ┌─────────────── per target ───────────────┐
//! call ──▶ breaker.try_acquire ──▶ attempt (timeout) ──▶ record ──▶ retry? ──▶ backoff
//!            │ open: reject immediately                 │
//!            └──────────────────────────────────────────┘
//! ```

pub mod breaker;
pub mod executor;

pub use breaker::{BreakerPermit, BreakerRejection, BreakerSnapshot, CircuitBreakerRegistry};
pub use executor::{FallbackStep, ResilienceError, ResilienceExecutor};
