//! Retry executor with circuit breaking and fallback chains

use super::breaker::CircuitBreakerRegistry;
use futures::future::BoxFuture;
use rand::Rng;
use review_domain::{CallError, ErrorCategory, RetryPolicy};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure surfaced after the executor has given up on a target
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResilienceError {
    #[error("Circuit open for {target} (probe allowed in {retry_after:?})")]
    CircuitOpen {
        target: String,
        retry_after: Duration,
    },

    #[error("{target}: gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        target: String,
        attempts: u32,
        #[source]
        last: CallError,
    },

    #[error("{target}: non-retryable failure after {attempts} attempt(s): {source}")]
    NonRetryable {
        target: String,
        attempts: u32,
        source: CallError,
    },

    #[error("Fallback chain is empty")]
    EmptyChain,
}

impl ResilienceError {
    pub fn target(&self) -> Option<&str> {
        match self {
            ResilienceError::CircuitOpen { target, .. }
            | ResilienceError::Exhausted { target, .. }
            | ResilienceError::NonRetryable { target, .. } => Some(target),
            ResilienceError::EmptyChain => None,
        }
    }

    /// Category of the last call error, if a call was made
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ResilienceError::Exhausted { last, .. } => Some(last.category),
            ResilienceError::NonRetryable { source, .. } => Some(source.category),
            _ => None,
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ResilienceError::CircuitOpen { .. })
    }
}

/// One entry of a fallback chain: an operation with its own target and budget
pub struct FallbackStep<'a, T> {
    pub target: String,
    pub policy: RetryPolicy,
    pub operation: Box<dyn FnMut() -> BoxFuture<'a, Result<T, CallError>> + Send + 'a>,
}

impl<'a, T> FallbackStep<'a, T> {
    pub fn new<F>(target: impl Into<String>, policy: RetryPolicy, operation: F) -> Self
    where
        F: FnMut() -> BoxFuture<'a, Result<T, CallError>> + Send + 'a,
    {
        Self {
            target: target.into(),
            policy,
            operation: Box::new(operation),
        }
    }
}

/// Applies retry policies and circuit breakers to outbound calls.
///
/// Cheap to clone; clones share the breaker registry.
#[derive(Clone)]
pub struct ResilienceExecutor {
    breakers: Arc<CircuitBreakerRegistry>,
}

impl ResilienceExecutor {
    pub fn new(breakers: Arc<CircuitBreakerRegistry>) -> Self {
        Self { breakers }
    }

    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// Run `operation` against `target` under `policy`.
    ///
    /// Each attempt is bounded by `policy.attempt_timeout`; an elapsed
    /// deadline is classified as a `timeout` failure. Authentication and
    /// fatal failures stop immediately, validation failures are retried at
    /// most once.
    pub async fn execute<T, F, Fut>(
        &self,
        target: &str,
        policy: &RetryPolicy,
        mut operation: F,
    ) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let max_attempts = policy.max_attempts.max(1);
        let mut retries: HashMap<ErrorCategory, u32> = HashMap::new();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            // Held until the outcome is recorded; a cancelled attempt
            // hands a half-open probe slot back on drop
            let permit = match self.breakers.try_acquire(target) {
                Ok(permit) => permit,
                Err(rejection) => {
                    debug!(endpoint = %target, attempt, "Rejected by open circuit");
                    return Err(ResilienceError::CircuitOpen {
                        target: target.to_string(),
                        retry_after: rejection.retry_after,
                    });
                }
            };

            let outcome = match tokio::time::timeout(policy.attempt_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(CallError::timeout(
                    target,
                    format!("attempt timed out after {:?}", policy.attempt_timeout),
                )),
            };

            let err = match outcome {
                Ok(value) => {
                    self.breakers.record_success(target);
                    if attempt > 1 {
                        debug!(endpoint = %target, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            self.breakers.record_failure(target, err.category);
            drop(permit);

            let category_retries = retries.entry(err.category).or_insert(0);
            if !policy.should_retry(err.category, *category_retries) {
                warn!(endpoint = %target, attempt, category = %err.category, "Non-retryable failure: {}", err.message);
                return Err(ResilienceError::NonRetryable {
                    target: target.to_string(),
                    attempts: attempt,
                    source: err,
                });
            }
            if attempt >= max_attempts {
                warn!(endpoint = %target, attempt, category = %err.category, "Retries exhausted: {}", err.message);
                return Err(ResilienceError::Exhausted {
                    target: target.to_string(),
                    attempts: attempt,
                    last: err,
                });
            }

            *category_retries += 1;
            let delay = policy.backoff(attempt - 1, err.category, jitter());
            warn!(
                endpoint = %target,
                attempt,
                category = %err.category,
                "Attempt failed, retrying in {:?}: {}",
                delay,
                err.message
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Try each step in order with its own retry budget.
    ///
    /// Returns the first success, or the last step's error once the chain is
    /// exhausted.
    pub async fn execute_with_fallbacks<T>(
        &self,
        steps: Vec<FallbackStep<'_, T>>,
    ) -> Result<T, ResilienceError> {
        let mut last_error = None;
        let total = steps.len();

        for (index, step) in steps.into_iter().enumerate() {
            let FallbackStep {
                target,
                policy,
                mut operation,
            } = step;
            match self.execute(&target, &policy, || operation()).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if index + 1 < total {
                        warn!(endpoint = %target, "Falling back to next step: {}", err);
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(ResilienceError::EmptyChain))
    }
}

/// Random factor in `0.5..=1.0` applied to every backoff delay
fn jitter() -> f64 {
    rand::thread_rng().gen_range(0.5..=1.0)
}
