//! Completion provider port
//!
//! One interchangeable external language-model provider. Adapters classify
//! every failure into a [`CallError`] so the resilience layer can decide
//! whether to retry, fall back or open the breaker.

use async_trait::async_trait;
use review_domain::CallError;

/// A single completion request, shared by assessment and drafting calls
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 2048,
            temperature: 0.3,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Name used as the circuit-breaker target
    fn name(&self) -> &str;

    /// Return the completion text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CallError>;
}
