//! Consensus round history

use super::vote::ConsensusVote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a consensus round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusOutcome {
    /// Fewer than two major issues: the draft may proceed
    Accepted,
    /// Two or more major issues: the draft must be rewritten
    RedraftRequired,
}

impl ConsensusOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ConsensusOutcome::Accepted)
    }
}

impl std::fmt::Display for ConsensusOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusOutcome::Accepted => write!(f, "Accepted"),
            ConsensusOutcome::RedraftRequired => write!(f, "Redraft required"),
        }
    }
}

/// A single completed review round of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRound {
    /// Iteration the round belongs to (1-indexed)
    pub round: u32,
    /// Version of the draft that was reviewed
    pub draft_version: u32,
    pub outcome: ConsensusOutcome,
    pub vote: ConsensusVote,
    pub decided_at: DateTime<Utc>,
}

impl ConsensusRound {
    pub fn new(round: u32, draft_version: u32, vote: ConsensusVote, decided_at: DateTime<Utc>) -> Self {
        let outcome = if vote.requires_redraft {
            ConsensusOutcome::RedraftRequired
        } else {
            ConsensusOutcome::Accepted
        };
        Self {
            round,
            draft_version,
            outcome,
            vote,
            decided_at,
        }
    }

    pub fn requires_redraft(&self) -> bool {
        !self.outcome.is_accepted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{AgentReview, ReviewDecision, ReviewSource};

    #[test]
    fn test_outcome_follows_vote() {
        let now = Utc::now();
        let reviews: Vec<_> = [ReviewDecision::MajorIssue, ReviewDecision::MajorIssue]
            .into_iter()
            .enumerate()
            .map(|(i, d)| AgentReview::new(format!("r{i}"), d, "bad", ReviewSource::RuleBasedFallback, now))
            .collect();
        let vote = ConsensusVote::from_reviews(&reviews, 2).unwrap();
        let round = ConsensusRound::new(1, 1, vote, now);
        assert_eq!(round.outcome, ConsensusOutcome::RedraftRequired);
        assert!(round.requires_redraft());
        assert_eq!(round.outcome.to_string(), "Redraft required");
    }
}
