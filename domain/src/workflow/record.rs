//! Review history records

use crate::review::AgentReview;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Decision submitted through the approval channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumanDecision {
    Approve,
    Reject,
}

impl HumanDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            HumanDecision::Approve => "approve",
            HumanDecision::Reject => "reject",
        }
    }
}

impl std::fmt::Display for HumanDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HumanDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" => Ok(HumanDecision::Approve),
            "reject" | "rejected" => Ok(HumanDecision::Reject),
            other => Err(format!("unknown decision: {}", other)),
        }
    }
}

/// One entry of a workflow's ordered review history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewRecord {
    Agent {
        round: u32,
        draft_version: u32,
        review: AgentReview,
    },
    Human {
        decision: HumanDecision,
        rationale: Option<String>,
        decided_at: DateTime<Utc>,
    },
}

impl ReviewRecord {
    pub fn agent_review(&self) -> Option<&AgentReview> {
        match self {
            ReviewRecord::Agent { review, .. } => Some(review),
            ReviewRecord::Human { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_decision_parse() {
        assert_eq!("Approve".parse(), Ok(HumanDecision::Approve));
        assert_eq!("rejected".parse(), Ok(HumanDecision::Reject));
        assert!("later".parse::<HumanDecision>().is_err());
    }

    #[test]
    fn test_human_record_is_tagged() {
        let record = ReviewRecord::Human {
            decision: HumanDecision::Reject,
            rationale: Some("Off-brand".into()),
            decided_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "human");
        assert_eq!(json["decision"], "reject");
        assert!(record.agent_review().is_none());
    }
}
