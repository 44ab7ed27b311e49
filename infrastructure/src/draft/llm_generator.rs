//! Provider-backed draft generator
//!
//! Asks the configured providers (fallback routing) for a JSON object
//! `{title, body, meta_description}`. A response that does not parse is
//! treated as a validation failure so the invoker retries it once and then
//! moves on to the next provider.

use async_trait::async_trait;
use review_application::{
    CompletionRequest, DraftGenerationError, DraftGenerator, ProviderInvoker,
};
use review_domain::review::parsing::extract_json_object;
use review_domain::{CallError, ContentDraft, DraftContent, DraftPromptTemplate, DraftRequest};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const DRAFT_MAX_TOKENS: u32 = 4096;
const DRAFT_TEMPERATURE: f32 = 0.7;

#[derive(Deserialize)]
struct GeneratedDraft {
    title: String,
    body: String,
    #[serde(default)]
    meta_description: Option<String>,
}

pub struct LlmDraftGenerator {
    invoker: Arc<ProviderInvoker>,
}

impl LlmDraftGenerator {
    pub fn new(invoker: Arc<ProviderInvoker>) -> Self {
        Self { invoker }
    }

    async fn request(&self, prompt: String) -> Result<DraftContent, DraftGenerationError> {
        let request = CompletionRequest::new(prompt)
            .with_system(DraftPromptTemplate::system())
            .with_max_tokens(DRAFT_MAX_TOKENS)
            .with_temperature(DRAFT_TEMPERATURE);

        let content = self
            .invoker
            .route_with(&request, |provider, response| {
                parse_draft(response).map_err(|e| CallError::validation(provider, e))
            })
            .await?;
        debug!(title = %content.title, "Draft generated");
        Ok(content)
    }
}

fn parse_draft(response: &str) -> Result<DraftContent, String> {
    let json = extract_json_object(response)
        .ok_or_else(|| "draft response contains no JSON object".to_string())?;
    let raw: GeneratedDraft =
        serde_json::from_str(json).map_err(|e| format!("malformed draft JSON: {}", e))?;
    if raw.title.trim().is_empty() || raw.body.trim().is_empty() {
        return Err("draft is missing a title or body".to_string());
    }

    let mut content = DraftContent::new(raw.title.trim(), raw.body.trim());
    if let Some(meta) = raw.meta_description.filter(|m| !m.trim().is_empty()) {
        content = content.with_meta_description(meta.trim());
    }
    Ok(content)
}

#[async_trait]
impl DraftGenerator for LlmDraftGenerator {
    fn name(&self) -> &str {
        "llm_draft_generator"
    }

    async fn generate(&self, request: &DraftRequest) -> Result<DraftContent, DraftGenerationError> {
        self.request(DraftPromptTemplate::initial(request)).await
    }

    async fn redraft(
        &self,
        request: &DraftRequest,
        previous: &ContentDraft,
        feedback: &str,
    ) -> Result<DraftContent, DraftGenerationError> {
        self.request(DraftPromptTemplate::redraft(request, previous, feedback))
            .await
    }
}
