//! Run Review Workflow use case
//!
//! Drives a content request through the consensus review loop:
//!
//! ```text
//! drafting ──▶ reviewing ──▶ vote
//!    ▲                        │ ≥2 major, budget left
//!    └── redraft_required ◀───┤
//!                             │ ≥2 major, budget spent (or sign-off mode)
//!                             ├──────────▶ awaiting_human_approval
//!                             │ otherwise
//!                             └──────────▶ approved
//! ```
//!
//! Each round fans out to every evaluator concurrently and waits for all of
//! them before the vote is computed.

use super::approval_gateway::{ApprovalError, HumanApprovalGateway};
use super::shared::settle;
use super::workflow_store::WorkflowStore;
use crate::evaluators::Evaluator;
use crate::ports::audit_logger::AuditEvent;
use crate::ports::draft_generator::{DraftGenerationError, DraftGenerator};
use crate::ports::progress::{NoProgress, ReviewProgressNotifier};
use review_domain::{
    AgentReview, ConsensusVote, ContentDraft, DomainError, DraftRequest, ReviewerKind,
    WorkflowId, WorkflowState, WorkflowStatus,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors surfaced to the workflow caller
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The workflow is left in its last consistent status and can be resumed
    #[error("Workflow {workflow_id}: draft generation failed: {source}")]
    DraftGeneration {
        workflow_id: WorkflowId,
        #[source]
        source: DraftGenerationError,
    },

    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(WorkflowId),

    #[error("Workflow {workflow_id} cannot be resumed from {status}")]
    NotResumable {
        workflow_id: WorkflowId,
        status: WorkflowStatus,
    },

    #[error("Workflow {0} is already running")]
    AlreadyRunning(WorkflowId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),
}

/// Input for [`RunReviewWorkflowUseCase::start_workflow`]
#[derive(Debug, Clone)]
pub struct StartWorkflowInput {
    pub request: DraftRequest,
    /// Reviewers that form the quorum; all configured evaluators when `None`
    pub reviewers: Option<Vec<ReviewerKind>>,
    /// Iteration budget; the policy default when `None`
    pub max_iterations: Option<u32>,
}

impl StartWorkflowInput {
    pub fn new(request: DraftRequest) -> Self {
        Self {
            request,
            reviewers: None,
            max_iterations: None,
        }
    }

    pub fn with_reviewers(mut self, reviewers: Vec<ReviewerKind>) -> Self {
        self.reviewers = Some(reviewers);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

/// Use case for running review workflows
pub struct RunReviewWorkflowUseCase {
    generator: Arc<dyn DraftGenerator>,
    evaluators: Vec<Arc<dyn Evaluator>>,
    gateway: Arc<HumanApprovalGateway>,
    /// Reviewer panel chosen at start, per workflow
    panels: Mutex<HashMap<WorkflowId, Vec<Arc<dyn Evaluator>>>>,
    /// Workflows currently being driven
    active: Mutex<HashSet<WorkflowId>>,
}

impl RunReviewWorkflowUseCase {
    /// The gateway supplies the store, clock, policy, event sink and audit logger
    pub fn new(
        generator: Arc<dyn DraftGenerator>,
        evaluators: Vec<Arc<dyn Evaluator>>,
        gateway: Arc<HumanApprovalGateway>,
    ) -> Self {
        Self {
            generator,
            evaluators,
            gateway,
            panels: Mutex::new(HashMap::new()),
            active: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &Arc<WorkflowStore> {
        self.gateway.store()
    }

    pub fn gateway(&self) -> &Arc<HumanApprovalGateway> {
        &self.gateway
    }

    /// Start a workflow with default (no-op) progress
    pub async fn start_workflow(&self, input: StartWorkflowInput) -> Result<WorkflowId, WorkflowError> {
        self.start_workflow_with_progress(input, &NoProgress).await
    }

    /// Start a workflow and drive it until it is approved or awaiting a human.
    ///
    /// On a draft-generation failure the workflow stays registered in its
    /// last consistent status; the error carries its id for
    /// [`resume_workflow`](Self::resume_workflow).
    pub async fn start_workflow_with_progress(
        &self,
        input: StartWorkflowInput,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<WorkflowId, WorkflowError> {
        let panel = self.select_panel(input.reviewers.as_deref())?;
        let max_iterations = input
            .max_iterations
            .unwrap_or(self.gateway.policy().max_iterations);
        let workflow_id = WorkflowId::generate();
        let state = WorkflowState::new(
            workflow_id.clone(),
            input.request,
            max_iterations,
            self.gateway.clock().now(),
        )?;

        info!(
            workflow_id = %workflow_id,
            "Starting review workflow for '{}' ({} reviewers, max {} iterations)",
            state.request().topic,
            panel.len(),
            max_iterations
        );
        self.gateway.audit().log(AuditEvent::new(
            "workflow_started",
            json!({
                "workflow_id": workflow_id,
                "topic": state.request().topic,
                "keywords": state.request().keywords,
                "reviewers": panel.iter().map(|e| e.kind()).collect::<Vec<_>>(),
                "max_iterations": max_iterations,
            }),
        ));

        self.store().insert(state).await;
        self.panels.lock().await.insert(workflow_id.clone(), panel);
        self.run_exclusive(&workflow_id, progress).await?;
        Ok(workflow_id)
    }

    /// Continue a workflow left in drafting, reviewing or redraft_required
    pub async fn resume_workflow(
        &self,
        workflow_id: &WorkflowId,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<WorkflowState, WorkflowError> {
        let state = self.load(workflow_id).await?;
        if !state.status().is_resumable() {
            return Err(WorkflowError::NotResumable {
                workflow_id: workflow_id.clone(),
                status: state.status(),
            });
        }
        info!(workflow_id = %workflow_id, "Resuming workflow from {}", state.status());
        self.run_exclusive(workflow_id, progress).await?;
        self.load(workflow_id).await
    }

    /// Point-in-time read. An overdue approval is expired on access.
    pub async fn get_workflow_state(&self, workflow_id: &WorkflowId) -> Result<WorkflowState, WorkflowError> {
        let state = self.load(workflow_id).await?;
        if !state.is_approval_overdue(self.gateway.clock().now()) {
            return Ok(state);
        }
        if let Some(token) = state.approval_token() {
            // Expires the workflow as a side effect
            let _ = self.gateway.inspect(token.as_str()).await;
        }
        self.load(workflow_id).await
    }

    fn select_panel(
        &self,
        reviewers: Option<&[ReviewerKind]>,
    ) -> Result<Vec<Arc<dyn Evaluator>>, WorkflowError> {
        let Some(kinds) = reviewers else {
            if self.evaluators.is_empty() {
                return Err(DomainError::InvalidConfiguration("no evaluators configured".into()).into());
            }
            return Ok(self.evaluators.clone());
        };

        let wanted: HashSet<ReviewerKind> = kinds.iter().copied().collect();
        if wanted.is_empty() {
            return Err(DomainError::InvalidRequest("at least one reviewer is required".into()).into());
        }
        let panel: Vec<_> = self
            .evaluators
            .iter()
            .filter(|e| wanted.contains(&e.kind()))
            .cloned()
            .collect();
        if panel.len() != wanted.len() {
            let available: HashSet<_> = panel.iter().map(|e| e.kind()).collect();
            let missing: Vec<_> = wanted
                .difference(&available)
                .map(|k| k.reviewer_name())
                .collect();
            return Err(DomainError::InvalidRequest(format!(
                "no evaluator configured for: {}",
                missing.join(", ")
            ))
            .into());
        }
        Ok(panel)
    }

    async fn run_exclusive(
        &self,
        workflow_id: &WorkflowId,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<(), WorkflowError> {
        if !self.active.lock().await.insert(workflow_id.clone()) {
            return Err(WorkflowError::AlreadyRunning(workflow_id.clone()));
        }
        let result = self.drive(workflow_id, progress).await;
        self.active.lock().await.remove(workflow_id);
        result
    }

    /// Step the state machine until it settles
    async fn drive(
        &self,
        workflow_id: &WorkflowId,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<(), WorkflowError> {
        loop {
            let state = self.load(workflow_id).await?;
            match state.status() {
                WorkflowStatus::Drafting => self.draft_step(&state, progress).await?,
                WorkflowStatus::Reviewing => self.review_step(&state, progress).await?,
                WorkflowStatus::RedraftRequired => {
                    let now = self.gateway.clock().now();
                    self.apply(workflow_id, |s| s.begin_redraft(now)).await?;
                }
                WorkflowStatus::AwaitingHumanApproval
                | WorkflowStatus::Approved
                | WorkflowStatus::Rejected
                | WorkflowStatus::Expired => {
                    // No further review rounds from here on
                    self.panels.lock().await.remove(workflow_id);
                    progress.on_workflow_settled(&state);
                    return Ok(());
                }
            }
        }
    }

    async fn draft_step(
        &self,
        state: &WorkflowState,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<(), WorkflowError> {
        let workflow_id = state.workflow_id();
        let request = state.request();

        let content = match state.current_draft() {
            None => {
                debug!(workflow_id = %workflow_id, "Generating initial draft");
                self.generator.generate(request).await
            }
            Some(previous) => {
                debug!(
                    workflow_id = %workflow_id,
                    "Generating redraft of v{}",
                    previous.version()
                );
                self.generator
                    .redraft(request, previous, state.pending_feedback().unwrap_or_default())
                    .await
            }
        }
        .map_err(|source| {
            warn!(workflow_id = %workflow_id, "Draft generation failed: {}", source);
            WorkflowError::DraftGeneration {
                workflow_id: workflow_id.clone(),
                source,
            }
        })?;

        let now = self.gateway.clock().now();
        let created_by = self.generator.name();
        let draft = match state.current_draft() {
            None => ContentDraft::initial(request, content, created_by, now),
            Some(previous) => previous.revise(
                content,
                created_by,
                state.pending_feedback().unwrap_or_default(),
                now,
            ),
        };
        progress.on_draft_ready(&draft);
        info!(
            workflow_id = %workflow_id,
            "Draft v{} ready ({} words)",
            draft.version(),
            draft.word_count()
        );

        self.apply(workflow_id, |s| s.attach_draft(draft, now)).await?;
        Ok(())
    }

    async fn review_step(
        &self,
        state: &WorkflowState,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<(), WorkflowError> {
        let workflow_id = state.workflow_id();
        let draft = state
            .current_draft()
            .cloned()
            .ok_or_else(|| DomainError::MissingDraft(workflow_id.to_string()))?;
        let panel = self.panel_for(workflow_id).await;
        let round = state.iteration_count();

        info!(
            workflow_id = %workflow_id,
            round,
            "Reviewing draft v{} with {} reviewers",
            draft.version(),
            panel.len()
        );
        progress.on_review_start(round, panel.len());

        let reviews = Self::collect_reviews(&panel, &draft, progress).await;
        let vote = ConsensusVote::from_reviews(&reviews, panel.len())?;
        info!(
            workflow_id = %workflow_id,
            round,
            "Vote {}: {} approved, {} minor, {} major",
            vote.vote_summary(),
            vote.approved_count,
            vote.minor_issue_count,
            vote.major_issue_count
        );
        self.gateway.audit().log(AuditEvent::new(
            "review_round",
            json!({
                "workflow_id": workflow_id,
                "round": round,
                "draft_version": draft.version(),
                "reviews": reviews,
                "requires_redraft": vote.requires_redraft,
            }),
        ));

        let now = self.gateway.clock().now();
        let recorded = {
            let vote = vote.clone();
            self.apply(workflow_id, move |s| s.record_round(reviews, vote, now))
                .await?
        };
        if let Some(round) = recorded.latest_round() {
            progress.on_round_complete(round);
        }

        if vote.requires_redraft && recorded.can_redraft() {
            let feedback = vote.combined_feedback.clone();
            self.apply(workflow_id, |s| s.request_redraft(feedback.clone(), now))
                .await?;
            info!(
                workflow_id = %workflow_id,
                "Redraft required ({} major issues)",
                vote.major_issue_count
            );
            self.gateway.audit().log(AuditEvent::new(
                "redraft_requested",
                json!({
                    "workflow_id": workflow_id,
                    "next_iteration": round + 1,
                    "feedback": feedback,
                }),
            ));
            progress.on_redraft(round + 1, &feedback);
        } else if vote.requires_redraft || self.gateway.policy().human_signoff {
            if vote.requires_redraft {
                warn!(
                    workflow_id = %workflow_id,
                    "Iteration budget of {} spent; escalating to human approval",
                    recorded.max_iterations()
                );
            }
            let ticket = self.gateway.open(workflow_id).await?;
            progress.on_escalation(&ticket);
        } else {
            let approved = self
                .apply(workflow_id, |s| s.approve_by_consensus(now))
                .await?;
            settle(
                &approved,
                self.gateway.events(),
                self.gateway.audit(),
                now,
            )
            .await;
        }
        Ok(())
    }

    /// Fan out to every evaluator and wait for all of them
    async fn collect_reviews(
        panel: &[Arc<dyn Evaluator>],
        draft: &ContentDraft,
        progress: &dyn ReviewProgressNotifier,
    ) -> Vec<AgentReview> {
        let mut join_set = JoinSet::new();
        for (index, evaluator) in panel.iter().enumerate() {
            let evaluator = Arc::clone(evaluator);
            let draft = draft.clone();
            join_set.spawn(async move { (index, evaluator.review(&draft).await) });
        }

        let mut reviews = Vec::with_capacity(panel.len());
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((index, review)) => {
                    debug!(
                        reviewer = %review.reviewer_name,
                        source = review.source.as_str(),
                        "Review returned: {}",
                        review.decision
                    );
                    progress.on_review_complete(&review);
                    reviews.push((index, review));
                }
                Err(e) => {
                    warn!("Evaluator task join error: {}", e);
                }
            }
        }
        reviews.sort_by_key(|(index, _)| *index);
        reviews.into_iter().map(|(_, r)| r).collect()
    }

    async fn panel_for(&self, workflow_id: &WorkflowId) -> Vec<Arc<dyn Evaluator>> {
        self.panels
            .lock()
            .await
            .get(workflow_id)
            .cloned()
            .unwrap_or_else(|| self.evaluators.clone())
    }

    async fn load(&self, workflow_id: &WorkflowId) -> Result<WorkflowState, WorkflowError> {
        self.store()
            .get(workflow_id)
            .await
            .ok_or_else(|| WorkflowError::UnknownWorkflow(workflow_id.clone()))
    }

    async fn apply<F>(&self, workflow_id: &WorkflowId, op: F) -> Result<WorkflowState, WorkflowError>
    where
        F: FnOnce(&mut WorkflowState) -> Result<(), DomainError>,
    {
        self.store()
            .update(workflow_id, op)
            .await
            .ok_or_else(|| WorkflowError::UnknownWorkflow(workflow_id.clone()))?
            .map_err(WorkflowError::from)
    }
}
