//! Domain error types

use crate::workflow::WorkflowStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid status transition for workflow {workflow_id}: {from} -> {to}")]
    InvalidTransition {
        workflow_id: String,
        from: WorkflowStatus,
        to: WorkflowStatus,
    },

    #[error("Quorum incomplete: expected {expected} reviews, received {received}")]
    QuorumIncomplete { expected: usize, received: usize },

    #[error("Iteration limit reached (max_iterations = {max_iterations})")]
    IterationLimit { max_iterations: u32 },

    #[error("Workflow {0} has no current draft")]
    MissingDraft(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl DomainError {
    /// Check if this error is the quorum guard firing
    pub fn is_quorum_incomplete(&self) -> bool {
        matches!(self, DomainError::QuorumIncomplete { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_incomplete_display() {
        let error = DomainError::QuorumIncomplete {
            expected: 3,
            received: 2,
        };
        assert_eq!(
            error.to_string(),
            "Quorum incomplete: expected 3 reviews, received 2"
        );
        assert!(error.is_quorum_incomplete());
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = DomainError::InvalidTransition {
            workflow_id: "wf-1".to_string(),
            from: WorkflowStatus::Approved,
            to: WorkflowStatus::Drafting,
        };
        assert_eq!(
            error.to_string(),
            "Invalid status transition for workflow wf-1: approved -> drafting"
        );
        assert!(!error.is_quorum_incomplete());
    }
}
