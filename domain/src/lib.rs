//! Domain layer for content-quorum
//!
//! This crate contains the entities and value objects of the consensus
//! review workflow. It has no dependencies on infrastructure, presentation
//! or an async runtime.
//!
//! # Core Concepts
//!
//! ## Review workflow
//!
//! A draft is reviewed by three independent evaluators (brand tone,
//! marketing/SEO, security and compliance). Their verdicts are reconciled
//! into a [`ConsensusVote`]; two or more major issues force a redraft, and a
//! workflow that runs out of iterations is escalated to a human.
//!
//! ## Resilience
//!
//! Every outbound call is classified into an [`ErrorCategory`] and retried
//! according to a [`RetryPolicy`], behind a per-target circuit breaker
//! configured by [`BreakerConfig`].

pub mod core;
pub mod draft;
pub mod prompt;
pub mod quorum;
pub mod resilience;
pub mod review;
pub mod workflow;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    ids::{ApprovalToken, DraftId, WorkflowId},
};
pub use draft::{ContentDraft, DraftContent, DraftRequest};
pub use prompt::{AssessmentPromptTemplate, DraftPromptTemplate};
pub use quorum::{Ballot, ConsensusOutcome, ConsensusRound, ConsensusVote, REDRAFT_MAJOR_THRESHOLD};
pub use resilience::{BreakerConfig, CallError, CircuitState, ErrorCategory, RetryPolicy};
pub use review::{AgentReview, ReviewDecision, ReviewSource, ReviewerKind, ServiceAssessment, parse_assessment};
pub use workflow::{HumanDecision, ReviewRecord, WorkflowEvent, WorkflowState, WorkflowStatus};
