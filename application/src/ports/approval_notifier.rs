//! Approval notification port
//!
//! Delivers a freshly opened approval ticket to a human. How the human is
//! reached (log line, chat message, e-mail) is up to the adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use review_domain::{ApprovalToken, WorkflowId, WorkflowState};
use serde::Serialize;

/// What `open` hands back for one escalated workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalTicket {
    pub workflow_id: WorkflowId,
    pub token: ApprovalToken,
    pub approval_url: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait ApprovalNotifier: Send + Sync {
    async fn notify(&self, ticket: &ApprovalTicket, state: &WorkflowState);
}

/// No-op notifier
pub struct NoApprovalNotifier;

#[async_trait]
impl ApprovalNotifier for NoApprovalNotifier {
    async fn notify(&self, _ticket: &ApprovalTicket, _state: &WorkflowState) {}
}
