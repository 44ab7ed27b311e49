//! Resilience value objects
//!
//! Error classification, retry policy and breaker configuration shared by
//! every outbound call. The executor that applies them lives in the
//! application layer.

mod category;
mod policy;

pub use category::{CallError, ErrorCategory};
pub use policy::{BreakerConfig, CircuitState, RetryPolicy};
