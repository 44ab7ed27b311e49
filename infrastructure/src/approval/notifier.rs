use async_trait::async_trait;
use review_application::{ApprovalNotifier, ApprovalTicket};
use review_domain::WorkflowState;
use tracing::info;

/// Announces approval tickets in the diagnostic log
pub struct LoggingApprovalNotifier;

#[async_trait]
impl ApprovalNotifier for LoggingApprovalNotifier {
    async fn notify(&self, ticket: &ApprovalTicket, state: &WorkflowState) {
        info!(
            workflow_id = %ticket.workflow_id,
            iteration = state.iteration_count(),
            expires_at = %ticket.expires_at.to_rfc3339(),
            "Human approval required: {}",
            ticket.approval_url
        );
    }
}
