//! Human approval gateway
//!
//! Escalated workflows wait for a person holding a single-use approval token.
//! Tokens are opaque random strings bound to one workflow; each one moves
//! through `open → consumed` or `open → expired` exactly once.
//!
//! The token table and the workflow store are locked one at a time, never
//! together.

use super::shared::settle;
use super::workflow_store::WorkflowStore;
use crate::config::WorkflowPolicy;
use crate::ports::approval_notifier::{ApprovalNotifier, ApprovalTicket, NoApprovalNotifier};
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::clock::Clock;
use crate::ports::event_sink::{NoEventSink, WorkflowEventSink};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use review_domain::{
    ApprovalToken, DomainError, HumanDecision, WorkflowId, WorkflowState, WorkflowStatus,
};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Random bytes per approval token
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenInvalidReason {
    Unknown,
    AlreadyConsumed,
}

impl fmt::Display for TokenInvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenInvalidReason::Unknown => write!(f, "unknown token"),
            TokenInvalidReason::AlreadyConsumed => write!(f, "token already used"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApprovalError {
    #[error("Approval token is invalid: {reason}")]
    TokenInvalid { reason: TokenInvalidReason },

    #[error("Approval token has expired")]
    TokenExpired,

    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(WorkflowId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApprovalError {
    fn invalid(reason: TokenInvalidReason) -> Self {
        ApprovalError::TokenInvalid { reason }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenState {
    Open,
    Consumed,
    Expired,
}

struct TokenBinding {
    workflow_id: WorkflowId,
    state: TokenState,
}

pub struct HumanApprovalGateway {
    store: Arc<WorkflowStore>,
    tokens: Mutex<HashMap<String, TokenBinding>>,
    policy: WorkflowPolicy,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ApprovalNotifier>,
    events: Arc<dyn WorkflowEventSink>,
    audit: Arc<dyn AuditLogger>,
}

impl HumanApprovalGateway {
    pub fn new(store: Arc<WorkflowStore>, policy: WorkflowPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            tokens: Mutex::new(HashMap::new()),
            policy,
            clock,
            notifier: Arc::new(NoApprovalNotifier),
            events: Arc::new(NoEventSink),
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ApprovalNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn WorkflowEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn store(&self) -> &Arc<WorkflowStore> {
        &self.store
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn events(&self) -> &Arc<dyn WorkflowEventSink> {
        &self.events
    }

    pub(crate) fn audit(&self) -> &dyn AuditLogger {
        self.audit.as_ref()
    }

    /// Escalate a reviewing workflow to a human and issue its token
    pub async fn open(&self, workflow_id: &WorkflowId) -> Result<ApprovalTicket, ApprovalError> {
        let now = self.clock.now();
        let expires_at = self.expiry_from(now)?;
        let token = generate_token();

        let state = self
            .store
            .update(workflow_id, |s| s.await_approval(token.clone(), expires_at, now))
            .await
            .ok_or_else(|| ApprovalError::UnknownWorkflow(workflow_id.clone()))??;

        self.tokens.lock().await.insert(
            token.as_str().to_string(),
            TokenBinding {
                workflow_id: workflow_id.clone(),
                state: TokenState::Open,
            },
        );

        let ticket = ApprovalTicket {
            workflow_id: workflow_id.clone(),
            approval_url: self.policy.approval_url(token.as_str()),
            token,
            expires_at,
        };
        info!(
            workflow_id = %workflow_id,
            "Awaiting human approval until {}",
            expires_at.to_rfc3339()
        );
        self.audit.log(AuditEvent::new(
            "approval_opened",
            json!({
                "workflow_id": workflow_id,
                "iteration_count": state.iteration_count(),
                "expires_at": expires_at,
            }),
        ));
        self.notifier.notify(&ticket, &state).await;
        Ok(ticket)
    }

    /// Apply a human decision. The token is consumed whatever the outcome.
    pub async fn submit_decision(
        &self,
        token: &str,
        decision: HumanDecision,
        rationale: Option<String>,
    ) -> Result<WorkflowState, ApprovalError> {
        let workflow_id = {
            let mut tokens = self.tokens.lock().await;
            let binding = tokens
                .get_mut(token)
                .ok_or_else(|| ApprovalError::invalid(TokenInvalidReason::Unknown))?;
            match binding.state {
                TokenState::Open => {}
                TokenState::Consumed => {
                    return Err(ApprovalError::invalid(TokenInvalidReason::AlreadyConsumed));
                }
                TokenState::Expired => return Err(ApprovalError::TokenExpired),
            }
            binding.state = TokenState::Consumed;
            binding.workflow_id.clone()
        };

        let now = self.clock.now();
        let mut expired_by_sweep = false;
        let state = self
            .store
            .update(&workflow_id, |s| {
                if s.status() == WorkflowStatus::Expired {
                    expired_by_sweep = true;
                    Ok(())
                } else if s.is_approval_overdue(now) {
                    s.expire(now)
                } else {
                    s.apply_human_decision(decision, rationale.clone(), now)
                }
            })
            .await
            .ok_or_else(|| ApprovalError::UnknownWorkflow(workflow_id.clone()))??;

        // The sweeper already settled this workflow; only the token lagged
        if expired_by_sweep {
            self.mark(token, TokenState::Expired).await;
            return Err(ApprovalError::TokenExpired);
        }

        if state.status() == WorkflowStatus::Expired {
            self.mark(token, TokenState::Expired).await;
            self.audit_expiry(&state);
            settle(&state, &self.events, self.audit.as_ref(), now).await;
            return Err(ApprovalError::TokenExpired);
        }

        info!(
            workflow_id = %workflow_id,
            decision = decision.as_str(),
            "Human decision recorded"
        );
        self.audit.log(AuditEvent::new(
            "human_decision",
            json!({
                "workflow_id": workflow_id,
                "decision": decision,
                "rationale": rationale,
            }),
        ));
        settle(&state, &self.events, self.audit.as_ref(), now).await;
        Ok(state)
    }

    /// Look up the workflow behind an open token, expiring it if overdue
    pub async fn inspect(&self, token: &str) -> Result<WorkflowState, ApprovalError> {
        let workflow_id = {
            let tokens = self.tokens.lock().await;
            let binding = tokens
                .get(token)
                .ok_or_else(|| ApprovalError::invalid(TokenInvalidReason::Unknown))?;
            match binding.state {
                TokenState::Open => binding.workflow_id.clone(),
                TokenState::Consumed => {
                    return Err(ApprovalError::invalid(TokenInvalidReason::AlreadyConsumed));
                }
                TokenState::Expired => return Err(ApprovalError::TokenExpired),
            }
        };

        let state = self
            .store
            .get(&workflow_id)
            .await
            .ok_or_else(|| ApprovalError::UnknownWorkflow(workflow_id.clone()))?;
        if state.is_approval_overdue(self.clock.now()) {
            self.expire_workflow(token, &workflow_id).await;
            return Err(ApprovalError::TokenExpired);
        }
        Ok(state)
    }

    /// Expire every overdue open token. Returns the workflows that expired.
    pub async fn sweep_expired(&self) -> Vec<WorkflowId> {
        let open: Vec<(String, WorkflowId)> = self
            .tokens
            .lock()
            .await
            .iter()
            .filter(|(_, b)| b.state == TokenState::Open)
            .map(|(t, b)| (t.clone(), b.workflow_id.clone()))
            .collect();

        let now = self.clock.now();
        let mut expired = Vec::new();
        for (token, workflow_id) in open {
            let overdue = self
                .store
                .get(&workflow_id)
                .await
                .is_some_and(|s| s.is_approval_overdue(now));
            if overdue && self.expire_workflow(&token, &workflow_id).await {
                expired.push(workflow_id);
            }
        }
        if !expired.is_empty() {
            debug!("Expiry sweep expired {} workflow(s)", expired.len());
        }
        expired
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `interval` until cancelled
    pub fn spawn_expiry_sweeper(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("Expiry sweeper stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        self.sweep_expired().await;
                    }
                }
            }
        })
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, ApprovalError> {
        chrono::Duration::from_std(self.policy.approval_ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                ApprovalError::Domain(DomainError::InvalidConfiguration(format!(
                    "approval ttl {:?} is out of range",
                    self.policy.approval_ttl
                )))
            })
    }

    async fn mark(&self, token: &str, state: TokenState) {
        if let Some(binding) = self.tokens.lock().await.get_mut(token) {
            binding.state = state;
        }
    }

    /// Expire the workflow and its token. False if the workflow moved on first.
    async fn expire_workflow(&self, token: &str, workflow_id: &WorkflowId) -> bool {
        let now = self.clock.now();
        let result = self
            .store
            .update(workflow_id, |s| {
                if s.is_approval_overdue(now) {
                    s.expire(now)
                } else {
                    Ok(())
                }
            })
            .await;

        match result {
            Some(Ok(state)) if state.status() == WorkflowStatus::Expired => {
                self.mark(token, TokenState::Expired).await;
                self.audit_expiry(&state);
                settle(&state, &self.events, self.audit.as_ref(), now).await;
                true
            }
            Some(Err(e)) => {
                warn!(workflow_id = %workflow_id, "Could not expire workflow: {}", e);
                false
            }
            _ => false,
        }
    }

    fn audit_expiry(&self, state: &WorkflowState) {
        info!(workflow_id = %state.workflow_id(), "Approval window expired");
        self.audit.log(AuditEvent::new(
            "workflow_expired",
            json!({
                "workflow_id": state.workflow_id(),
                "expired_at": state.updated_at(),
            }),
        ));
    }
}

fn generate_token() -> ApprovalToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    ApprovalToken::new(URL_SAFE_NO_PAD.encode(bytes))
}
