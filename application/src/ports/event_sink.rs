//! Terminal workflow event port
//!
//! Receives one [`WorkflowEvent`] per workflow when it reaches approved,
//! rejected or expired. Delivery problems are the sink's own concern and
//! never reach the workflow.

use async_trait::async_trait;
use review_domain::WorkflowEvent;

#[async_trait]
pub trait WorkflowEventSink: Send + Sync {
    async fn publish(&self, event: &WorkflowEvent);
}

/// No-op sink
pub struct NoEventSink;

#[async_trait]
impl WorkflowEventSink for NoEventSink {
    async fn publish(&self, _event: &WorkflowEvent) {}
}
