use async_trait::async_trait;
use review_application::WorkflowEventSink;
use review_domain::WorkflowEvent;
use tracing::info;

/// Writes terminal events to the diagnostic log
pub struct LoggingEventSink;

#[async_trait]
impl WorkflowEventSink for LoggingEventSink {
    async fn publish(&self, event: &WorkflowEvent) {
        info!(
            workflow_id = %event.workflow_id,
            status = %event.status,
            iterations = event.iteration_count,
            version = event.final_draft.as_ref().map(|d| d.version()),
            "Workflow finished"
        );
    }
}
