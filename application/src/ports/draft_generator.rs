//! Draft generation port
//!
//! Content generation is an injected collaborator: the orchestrator only
//! asks for the first version and for revisions against reviewer feedback.

use crate::providers::InvocationError;
use async_trait::async_trait;
use review_domain::{ContentDraft, DraftContent, DraftRequest};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DraftGenerationError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("Malformed draft: {0}")]
    Malformed(String),

    #[error("Draft generation failed: {0}")]
    Other(String),
}

#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Recorded as `created_by` on every draft this generator produces
    fn name(&self) -> &str {
        "draft_generator"
    }

    async fn generate(&self, request: &DraftRequest) -> Result<DraftContent, DraftGenerationError>;

    async fn redraft(
        &self,
        request: &DraftRequest,
        previous: &ContentDraft,
        feedback: &str,
    ) -> Result<DraftContent, DraftGenerationError>;
}
