//! Workflow aggregate root

use super::record::{HumanDecision, ReviewRecord};
use super::status::WorkflowStatus;
use crate::core::error::DomainError;
use crate::core::ids::{ApprovalToken, WorkflowId};
use crate::draft::{ContentDraft, DraftRequest};
use crate::quorum::{ConsensusRound, ConsensusVote};
use crate::review::AgentReview;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutable state of one review workflow.
///
/// Invariants upheld by the methods below:
/// - `iteration_count` never exceeds `max_iterations`
/// - `approval_token` and `token_expires_at` are set whenever the status is
///   `awaiting_human_approval`, and the token is cleared once consumed
/// - a round is recorded only with a full quorum of reviews
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    workflow_id: WorkflowId,
    request: DraftRequest,
    current_draft: Option<ContentDraft>,
    draft_history: Vec<ContentDraft>,
    review_history: Vec<ReviewRecord>,
    rounds: Vec<ConsensusRound>,
    /// 1-based number of the current draft/review iteration
    iteration_count: u32,
    max_iterations: u32,
    status: WorkflowStatus,
    #[serde(skip)]
    approval_token: Option<ApprovalToken>,
    token_expires_at: Option<DateTime<Utc>>,
    /// Combined feedback the next draft version must address
    pending_feedback: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(
        workflow_id: WorkflowId,
        request: DraftRequest,
        max_iterations: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if max_iterations == 0 {
            return Err(DomainError::InvalidConfiguration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            workflow_id,
            request,
            current_draft: None,
            draft_history: Vec::new(),
            review_history: Vec::new(),
            rounds: Vec::new(),
            iteration_count: 1,
            max_iterations,
            status: WorkflowStatus::Drafting,
            approval_token: None,
            token_expires_at: None,
            pending_feedback: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn transition(&mut self, to: WorkflowStatus, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                workflow_id: self.workflow_id.to_string(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    fn ensure_status(&self, expected: WorkflowStatus, to: WorkflowStatus) -> Result<(), DomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                workflow_id: self.workflow_id.to_string(),
                from: self.status,
                to,
            })
        }
    }

    /// Install a freshly generated draft version and move to review
    pub fn attach_draft(&mut self, draft: ContentDraft, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(WorkflowStatus::Reviewing, now)?;
        self.draft_history.push(draft.clone());
        self.current_draft = Some(draft);
        self.pending_feedback = None;
        Ok(())
    }

    /// Record a full round of reviews and its vote against the current draft
    pub fn record_round(
        &mut self,
        reviews: Vec<AgentReview>,
        vote: ConsensusVote,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_status(WorkflowStatus::Reviewing, WorkflowStatus::Reviewing)?;
        if reviews.len() != vote.total_votes() {
            return Err(DomainError::QuorumIncomplete {
                expected: vote.total_votes(),
                received: reviews.len(),
            });
        }
        let draft_version = self
            .current_draft
            .as_ref()
            .map(ContentDraft::version)
            .ok_or_else(|| DomainError::MissingDraft(self.workflow_id.to_string()))?;

        let round = self.iteration_count;
        self.review_history
            .extend(reviews.into_iter().map(|review| ReviewRecord::Agent {
                round,
                draft_version,
                review,
            }));
        self.rounds
            .push(ConsensusRound::new(round, draft_version, vote, now));
        self.updated_at = now;
        Ok(())
    }

    /// Whether another redraft fits within `max_iterations`
    pub fn can_redraft(&self) -> bool {
        self.iteration_count < self.max_iterations
    }

    pub fn request_redraft(
        &mut self,
        feedback: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.can_redraft() {
            return Err(DomainError::IterationLimit {
                max_iterations: self.max_iterations,
            });
        }
        self.transition(WorkflowStatus::RedraftRequired, now)?;
        self.pending_feedback = Some(feedback.into());
        Ok(())
    }

    /// Start the next iteration; the pending feedback stays until a draft is attached
    pub fn begin_redraft(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(WorkflowStatus::Drafting, now)?;
        self.iteration_count += 1;
        Ok(())
    }

    pub fn approve_by_consensus(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_status(WorkflowStatus::Reviewing, WorkflowStatus::Approved)?;
        self.transition(WorkflowStatus::Approved, now)
    }

    pub fn await_approval(
        &mut self,
        token: ApprovalToken,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.transition(WorkflowStatus::AwaitingHumanApproval, now)?;
        self.approval_token = Some(token);
        self.token_expires_at = Some(expires_at);
        Ok(())
    }

    pub fn apply_human_decision(
        &mut self,
        decision: HumanDecision,
        rationale: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let to = match decision {
            HumanDecision::Approve => WorkflowStatus::Approved,
            HumanDecision::Reject => WorkflowStatus::Rejected,
        };
        self.ensure_status(WorkflowStatus::AwaitingHumanApproval, to)?;
        self.transition(to, now)?;
        self.approval_token = None;
        self.review_history.push(ReviewRecord::Human {
            decision,
            rationale,
            decided_at: now,
        });
        Ok(())
    }

    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(WorkflowStatus::Expired, now)?;
        self.approval_token = None;
        Ok(())
    }

    /// Awaiting approval past `token_expires_at`
    pub fn is_approval_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == WorkflowStatus::AwaitingHumanApproval
            && self.token_expires_at.is_some_and(|at| now > at)
    }

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn request(&self) -> &DraftRequest {
        &self.request
    }

    pub fn current_draft(&self) -> Option<&ContentDraft> {
        self.current_draft.as_ref()
    }

    pub fn draft_history(&self) -> &[ContentDraft] {
        &self.draft_history
    }

    pub fn review_history(&self) -> &[ReviewRecord] {
        &self.review_history
    }

    pub fn agent_reviews(&self) -> impl Iterator<Item = &AgentReview> {
        self.review_history.iter().filter_map(ReviewRecord::agent_review)
    }

    /// Agent reviews of the most recent round
    pub fn latest_reviews(&self) -> Vec<&AgentReview> {
        let Some(last) = self.rounds.last() else {
            return Vec::new();
        };
        self.review_history
            .iter()
            .filter_map(|r| match r {
                ReviewRecord::Agent { round, review, .. } if *round == last.round => Some(review),
                _ => None,
            })
            .collect()
    }

    pub fn rounds(&self) -> &[ConsensusRound] {
        &self.rounds
    }

    pub fn latest_round(&self) -> Option<&ConsensusRound> {
        self.rounds.last()
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn approval_token(&self) -> Option<&ApprovalToken> {
        self.approval_token.as_ref()
    }

    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.token_expires_at
    }

    pub fn pending_feedback(&self) -> Option<&str> {
        self.pending_feedback.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
