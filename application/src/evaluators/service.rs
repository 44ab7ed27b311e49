//! Service-backed assessment

use crate::ports::completion_provider::CompletionRequest;
use crate::providers::{InvocationError, ProviderInvoker};
use review_domain::{
    AssessmentPromptTemplate, CallError, ContentDraft, ReviewerKind, ServiceAssessment,
    parse_assessment,
};
use std::sync::Arc;

/// Asks the configured providers for a structured verdict on a draft.
///
/// Calls go through fallback routing, so a garbled answer counts as a
/// validation failure and is retried or handed to the next provider.
#[derive(Clone)]
pub struct ServiceAssessor {
    invoker: Arc<ProviderInvoker>,
}

impl ServiceAssessor {
    pub fn new(invoker: Arc<ProviderInvoker>) -> Self {
        Self { invoker }
    }

    pub async fn assess(
        &self,
        kind: ReviewerKind,
        draft: &ContentDraft,
        guidelines: &str,
    ) -> Result<ServiceAssessment, InvocationError> {
        let request =
            CompletionRequest::new(AssessmentPromptTemplate::assessment(kind, draft, guidelines))
                .with_system(AssessmentPromptTemplate::system(kind))
                .with_max_tokens(1024)
                .with_temperature(0.1);

        self.invoker
            .route_with(&request, |provider, content| {
                parse_assessment(content).map_err(|e| CallError::validation(provider, e))
            })
            .await
    }
}
