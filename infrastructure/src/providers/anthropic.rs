//! Anthropic Messages API adapter

use super::http_error::{read_success, transport_error};
use async_trait::async_trait;
use reqwest::Client;
use review_application::{CompletionProvider, CompletionRequest};
use review_domain::CallError;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    name: String,
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: Option<u32>,
}

impl AnthropicProvider {
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

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CallError> {
        let max_tokens = self
            .max_tokens
            .map_or(request.max_tokens, |cap| cap.min(request.max_tokens));
        let mut body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "temperature": request.temperature,
            "messages": [{"role": "user", "content": request.prompt}],
        });
        if let Some(system) = &request.system {
            body["system"] = json!(system);
        }

        debug!(provider = %self.name, model = %self.model, "Sending messages request");
        let mut builder = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("anthropic-version", API_VERSION)
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&self.name, &e))?;
        let body = read_success(&self.name, response).await?;

        let parsed: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
            CallError::validation(&self.name, format!("unreadable messages response: {}", e))
        })?;
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(CallError::validation(&self.name, "messages response has no text"));
        }
        Ok(text)
    }
}
