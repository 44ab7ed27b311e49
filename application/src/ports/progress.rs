//! Progress notification port
//!
//! Defines the interface for reporting progress while a review workflow runs.

use crate::ports::approval_notifier::ApprovalTicket;
use review_domain::{AgentReview, ConsensusRound, ContentDraft, WorkflowState};

/// Callback for progress updates during a review workflow
///
/// Implementations live in the presentation layer. Every method has a no-op
/// default so reporters implement only what they display.
pub trait ReviewProgressNotifier: Send + Sync {
    /// Called when a draft version is ready for review
    fn on_draft_ready(&self, _draft: &ContentDraft) {}

    /// Called when the evaluators are dispatched for a round
    fn on_review_start(&self, _round: u32, _reviewers: usize) {}

    /// Called as each evaluator returns
    fn on_review_complete(&self, _review: &AgentReview) {}

    /// Called once the round's vote is computed
    fn on_round_complete(&self, _round: &ConsensusRound) {}

    /// Called when a redraft is requested
    fn on_redraft(&self, _next_iteration: u32, _feedback: &str) {}

    /// Called when the workflow is escalated to a human
    fn on_escalation(&self, _ticket: &ApprovalTicket) {}

    /// Called when the workflow stops running (terminal or awaiting approval)
    fn on_workflow_settled(&self, _state: &WorkflowState) {}
}

/// No-op progress notifier
pub struct NoProgress;

impl ReviewProgressNotifier for NoProgress {}
