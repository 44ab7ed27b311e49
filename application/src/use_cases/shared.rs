//! Helpers shared by the workflow and approval use cases.

use crate::ports::audit_logger::{AuditEvent, AuditLogger};
use crate::ports::event_sink::WorkflowEventSink;
use chrono::{DateTime, Utc};
use review_domain::{WorkflowEvent, WorkflowState};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Publish the terminal event for `state`, if it is terminal, and audit it.
///
/// Delivery runs on its own task. The caller waits for it, but a caller
/// that is dropped mid-delivery does not take the event down with it.
pub(crate) async fn settle(
    state: &WorkflowState,
    events: &Arc<dyn WorkflowEventSink>,
    audit: &dyn AuditLogger,
    now: DateTime<Utc>,
) {
    let Some(event) = WorkflowEvent::terminal(state, now) else {
        return;
    };
    info!(
        workflow_id = %state.workflow_id(),
        status = state.status().as_str(),
        "Workflow settled after {} iteration(s)",
        state.iteration_count()
    );
    audit.log(AuditEvent::new(
        "workflow_completed",
        json!({
            "workflow_id": state.workflow_id(),
            "status": state.status(),
            "iteration_count": state.iteration_count(),
            "draft_version": state.current_draft().map(|d| d.version()),
        }),
    ));
    let sink = Arc::clone(events);
    let delivery = tokio::spawn(async move { sink.publish(&event).await });
    if let Err(e) = delivery.await {
        warn!(workflow_id = %state.workflow_id(), "Event delivery task failed: {}", e);
    }
}
