//! Application layer for content-quorum
//!
//! This crate contains use cases, port definitions, the resilience layer,
//! provider invocation, evaluators and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod evaluators;
pub mod ports;
pub mod providers;
pub mod resilience;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{
    BrandGuidelines, ComplianceGuidelines, ResilienceSettings, ReviewGuidelines, SeoGuidelines,
    WorkflowPolicy,
};
pub use evaluators::{Evaluator, ReviewEvaluator, ServiceAssessor, review_panel};
pub use ports::{
    approval_notifier::{ApprovalNotifier, ApprovalTicket, NoApprovalNotifier},
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    clock::{Clock, SystemClock},
    completion_provider::{CompletionProvider, CompletionRequest},
    draft_generator::{DraftGenerationError, DraftGenerator},
    event_sink::{NoEventSink, WorkflowEventSink},
    progress::{NoProgress, ReviewProgressNotifier},
};
pub use providers::{
    InvocationError, ProviderInvoker, ProviderResult, RankedResponse, ResponseScorer,
    RoundTableOutcome,
};
pub use resilience::{CircuitBreakerRegistry, ResilienceError, ResilienceExecutor};
pub use use_cases::approval_gateway::{ApprovalError, HumanApprovalGateway, TokenInvalidReason};
pub use use_cases::run_review_workflow::{
    RunReviewWorkflowUseCase, StartWorkflowInput, WorkflowError,
};
pub use use_cases::workflow_store::WorkflowStore;
