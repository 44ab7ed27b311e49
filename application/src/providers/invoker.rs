//! Fallback routing and round-table querying

use crate::config::ResilienceSettings;
use crate::ports::completion_provider::{CompletionProvider, CompletionRequest};
use crate::resilience::{FallbackStep, ResilienceError, ResilienceExecutor};
use futures::FutureExt;
use review_domain::{CallError, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone)]
pub enum InvocationError {
    #[error("No providers configured")]
    NoProviders,

    #[error("All providers failed; last error: {0}")]
    AllFailed(#[source] ResilienceError),

    #[error("All {} round-table providers failed", .0.len())]
    RoundTableFailed(Vec<ProviderFailure>),
}

/// One provider's successful completion
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub provider: String,
    pub content: String,
    /// Wall time across all attempts
    pub latency: Duration,
}

/// One provider that failed after exhausting its retries
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ResilienceError,
}

/// Results of a round-table query, in provider order
#[derive(Debug, Clone, Default)]
pub struct RoundTableOutcome {
    pub results: Vec<ProviderResult>,
    pub failures: Vec<ProviderFailure>,
}

/// Invokes the configured providers through the resilience executor
pub struct ProviderInvoker {
    providers: Vec<Arc<dyn CompletionProvider>>,
    executor: ResilienceExecutor,
    fallback_policy: RetryPolicy,
    round_table_policy: RetryPolicy,
}

impl ProviderInvoker {
    /// `providers` order is the fallback-routing order
    pub fn new(
        providers: Vec<Arc<dyn CompletionProvider>>,
        executor: ResilienceExecutor,
        settings: &ResilienceSettings,
    ) -> Self {
        Self {
            providers,
            executor,
            fallback_policy: settings.fallback.clone(),
            round_table_policy: settings.round_table.clone(),
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn executor(&self) -> &ResilienceExecutor {
        &self.executor
    }

    /// Fallback routing: first provider that answers wins
    pub async fn route(&self, request: &CompletionRequest) -> Result<ProviderResult, InvocationError> {
        let started = Instant::now();
        let mut result = self
            .route_with(request, |provider, content| {
                Ok(ProviderResult {
                    provider: provider.to_string(),
                    content: content.to_string(),
                    latency: Duration::ZERO,
                })
            })
            .await?;
        result.latency = started.elapsed();
        Ok(result)
    }

    /// Fallback routing with a response parser.
    ///
    /// `parse` runs inside each attempt, so a response it rejects (returned
    /// as a `validation` [`CallError`]) is retried once and then handed to
    /// the next provider like any other failure.
    pub async fn route_with<T, P>(
        &self,
        request: &CompletionRequest,
        parse: P,
    ) -> Result<T, InvocationError>
    where
        T: Send + 'static,
        P: Fn(&str, &str) -> Result<T, CallError> + Send + Sync,
    {
        if self.providers.is_empty() {
            return Err(InvocationError::NoProviders);
        }

        let parse = &parse;
        let steps: Vec<FallbackStep<'_, T>> = self
            .providers
            .iter()
            .map(|provider| {
                let provider = Arc::clone(provider);
                FallbackStep::new(
                    provider.name().to_string(),
                    self.fallback_policy.clone(),
                    move || {
                        let provider = Arc::clone(&provider);
                        let request = request.clone();
                        async move {
                            let content = provider.complete(&request).await?;
                            parse(provider.name(), &content)
                        }
                        .boxed()
                    },
                )
            })
            .collect();

        self.executor
            .execute_with_fallbacks(steps)
            .await
            .map_err(InvocationError::AllFailed)
    }

    /// Round-table querying: ask every provider concurrently.
    ///
    /// A provider that fails all retries is reported in `failures` and left
    /// out of `results`; the call fails only when no provider succeeds.
    pub async fn round_table(
        &self,
        request: &CompletionRequest,
    ) -> Result<RoundTableOutcome, InvocationError> {
        if self.providers.is_empty() {
            return Err(InvocationError::NoProviders);
        }
        info!("Round table across {} providers", self.providers.len());

        let mut join_set = JoinSet::new();
        for (index, provider) in self.providers.iter().enumerate() {
            let provider = Arc::clone(provider);
            let executor = self.executor.clone();
            let policy = self.round_table_policy.clone();
            let request = request.clone();

            join_set.spawn(async move {
                let started = Instant::now();
                let name = provider.name().to_string();
                let result = executor
                    .execute(&name, &policy, || provider.complete(&request))
                    .await;
                (index, name, result, started.elapsed())
            });
        }

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, provider, Ok(content), latency)) => {
                    debug!(provider = %provider, "Round-table response received");
                    successes.push((
                        index,
                        ProviderResult {
                            provider,
                            content,
                            latency,
                        },
                    ));
                }
                Ok((index, provider, Err(error), _)) => {
                    warn!(provider = %provider, "Round-table provider failed: {}", error);
                    failures.push((index, ProviderFailure { provider, error }));
                }
                Err(e) => {
                    warn!("Round-table task join error: {}", e);
                }
            }
        }

        successes.sort_by_key(|(index, _)| *index);
        failures.sort_by_key(|(index, _)| *index);
        let outcome = RoundTableOutcome {
            results: successes.into_iter().map(|(_, r)| r).collect(),
            failures: failures.into_iter().map(|(_, f)| f).collect(),
        };

        if outcome.results.is_empty() {
            return Err(InvocationError::RoundTableFailed(outcome.failures));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitBreakerRegistry;
    use crate::testing::ScriptedProvider;
    use review_domain::ErrorCategory;

    fn invoker(providers: Vec<Arc<dyn CompletionProvider>>) -> ProviderInvoker {
        ProviderInvoker::new(
            providers,
            ResilienceExecutor::new(Arc::new(CircuitBreakerRegistry::default())),
            &ResilienceSettings::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_falls_back_to_second_provider() {
        let first = ScriptedProvider::always_failing("first", ErrorCategory::ServerError);
        let second = ScriptedProvider::always("second", "hello");
        let invoker = invoker(vec![first.arc(), second.arc()]);

        let result = invoker.route(&CompletionRequest::new("hi")).await.unwrap();
        assert_eq!(result.provider, "second");
        assert_eq!(result.content, "hello");
        // Tight per-provider budget: two attempts against the failing provider
        assert_eq!(first.calls(), 2);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_surfaces_last_failure() {
        let invoker = invoker(vec![
            ScriptedProvider::always_failing("a", ErrorCategory::Network).arc(),
            ScriptedProvider::always_failing("b", ErrorCategory::Authentication).arc(),
        ]);
        let err = invoker.route(&CompletionRequest::new("hi")).await.unwrap_err();
        match err {
            InvocationError::AllFailed(last) => {
                assert_eq!(last.target(), Some("b"));
                assert_eq!(last.category(), Some(ErrorCategory::Authentication));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_with_parse_failure_moves_on() {
        let invoker = invoker(vec![
            ScriptedProvider::always("garbled", "not json").arc(),
            ScriptedProvider::always("clean", "{\"ok\": true}").arc(),
        ]);
        let parsed = invoker
            .route_with(&CompletionRequest::new("hi"), |provider, content| {
                if content.starts_with('{') {
                    Ok(provider.to_string())
                } else {
                    Err(CallError::validation(provider, "expected JSON"))
                }
            })
            .await
            .unwrap();
        assert_eq!(parsed, "clean");
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_table_excludes_failed_provider() {
        let failing = ScriptedProvider::always_failing("b", ErrorCategory::ServerError);
        let invoker = invoker(vec![
            ScriptedProvider::always("a", "answer a").arc(),
            failing.arc(),
            ScriptedProvider::always("c", "answer c").arc(),
        ]);

        let outcome = invoker.round_table(&CompletionRequest::new("q")).await.unwrap();
        let names: Vec<_> = outcome.results.iter().map(|r| r.provider.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].provider, "b");
        // Generous per-provider budget: three attempts
        assert_eq!(failing.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_table_fails_when_all_fail() {
        let invoker = invoker(vec![
            ScriptedProvider::always_failing("a", ErrorCategory::Network).arc(),
            ScriptedProvider::always_failing("b", ErrorCategory::Fatal).arc(),
        ]);
        let err = invoker.round_table(&CompletionRequest::new("q")).await.unwrap_err();
        assert!(matches!(err, InvocationError::RoundTableFailed(ref f) if f.len() == 2));
    }

    #[tokio::test]
    async fn test_no_providers() {
        let invoker = invoker(vec![]);
        assert!(matches!(
            invoker.route(&CompletionRequest::new("q")).await,
            Err(InvocationError::NoProviders)
        ));
    }
}
