//! OpenAI-compatible chat-completions adapter
//!
//! Works against any endpoint exposing `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style proxies, local model servers).

use super::http_error::{read_success, transport_error};
use async_trait::async_trait;
use reqwest::Client;
use review_application::{CompletionProvider, CompletionRequest};
use review_domain::CallError;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

pub struct OpenAiCompatibleProvider {
    name: String,
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: Option<u32>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            max_tokens: None,
        }
    }

    /// Cap applied on top of each request's own `max_tokens`
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let max_tokens = self
            .max_tokens
            .map_or(request.max_tokens, |cap| cap.min(request.max_tokens));
        json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": request.temperature,
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CallError> {
        debug!(provider = %self.name, model = %self.model, "Sending chat completion");
        let mut builder = self.client.post(self.endpoint()).json(&self.body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&self.name, &e))?;
        let body = read_success(&self.name, response).await?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            CallError::validation(&self.name, format!("unreadable chat completion: {}", e))
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CallError::validation(&self.name, "chat completion has no content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::spawn_stub;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use review_domain::ErrorCategory;

    #[tokio::test]
    async fn test_complete_reads_first_choice() {
        let router = Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "gpt-test");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["max_tokens"], 256);
                Json(json!({"choices": [{"message": {"role": "assistant", "content": "hello"}}]}))
            }),
        );
        let base = spawn_stub(router).await;
        let provider =
            OpenAiCompatibleProvider::new("primary", format!("{}/", base), "gpt-test", Some("sk-test".into()))
                .with_max_tokens(Some(256));

        let request = CompletionRequest::new("hi").with_system("be brief");
        assert_eq!(provider.complete(&request).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_rate_limit_is_classified() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = spawn_stub(router).await;
        let provider = OpenAiCompatibleProvider::new("primary", base, "gpt-test", None);

        let err = provider.complete(&CompletionRequest::new("hi")).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert_eq!(err.target, "primary");
        assert!(err.message.contains("slow down"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_validation_failure() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let base = spawn_stub(router).await;
        let provider = OpenAiCompatibleProvider::new("primary", base, "gpt-test", None);

        let err = provider.complete(&CompletionRequest::new("hi")).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_failure() {
        let provider =
            OpenAiCompatibleProvider::new("primary", "http://127.0.0.1:9", "gpt-test", None);
        let err = provider.complete(&CompletionRequest::new("hi")).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::Network);
    }
}
