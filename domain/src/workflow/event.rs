//! Terminal workflow notification

use super::state::WorkflowState;
use super::status::WorkflowStatus;
use crate::core::ids::WorkflowId;
use crate::draft::ContentDraft;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emitted once a workflow reaches approved, rejected or expired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub iteration_count: u32,
    pub final_draft: Option<ContentDraft>,
    pub occurred_at: DateTime<Utc>,
}

impl WorkflowEvent {
    /// Build the event for a terminal state; `None` while the workflow is still running
    pub fn terminal(state: &WorkflowState, occurred_at: DateTime<Utc>) -> Option<Self> {
        if !state.status().is_terminal() {
            return None;
        }
        Some(Self {
            workflow_id: state.workflow_id().clone(),
            status: state.status(),
            iteration_count: state.iteration_count(),
            final_draft: state.current_draft().cloned(),
            occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftRequest;

    #[test]
    fn test_no_event_for_running_workflow() {
        let request = DraftRequest::new("Topic", vec![]).unwrap();
        let state = WorkflowState::new(WorkflowId::new("wf"), request, 2, Utc::now()).unwrap();
        assert!(WorkflowEvent::terminal(&state, Utc::now()).is_none());
    }
}
