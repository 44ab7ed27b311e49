//! Workflow status machine

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Drafting,
    Reviewing,
    RedraftRequired,
    AwaitingHumanApproval,
    Approved,
    Rejected,
    Expired,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Drafting => "drafting",
            WorkflowStatus::Reviewing => "reviewing",
            WorkflowStatus::RedraftRequired => "redraft_required",
            WorkflowStatus::AwaitingHumanApproval => "awaiting_human_approval",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Rejected => "rejected",
            WorkflowStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Approved | WorkflowStatus::Rejected | WorkflowStatus::Expired
        )
    }

    /// Statuses a workflow may be resumed from after a draft-generation failure
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Drafting | WorkflowStatus::Reviewing | WorkflowStatus::RedraftRequired
        )
    }

    pub fn can_transition_to(&self, next: WorkflowStatus) -> bool {
        use WorkflowStatus::*;
        matches!(
            (self, next),
            (Drafting, Reviewing)
                | (Reviewing, Approved)
                | (Reviewing, RedraftRequired)
                | (Reviewing, AwaitingHumanApproval)
                | (RedraftRequired, Drafting)
                | (AwaitingHumanApproval, Approved)
                | (AwaitingHumanApproval, Rejected)
                | (AwaitingHumanApproval, Expired)
        )
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
