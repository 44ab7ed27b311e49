//! Consensus vote aggregation

use crate::core::error::DomainError;
use crate::review::{AgentReview, ReviewDecision};
use serde::{Deserialize, Serialize};

/// Number of `major_issue` verdicts that forces a redraft
pub const REDRAFT_MAJOR_THRESHOLD: usize = 2;

/// One reviewer's decision as counted in a vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub reviewer: String,
    pub decision: ReviewDecision,
}

/// Aggregation of all reviews for one round
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use review_domain::quorum::ConsensusVote;
/// use review_domain::review::{AgentReview, ReviewDecision, ReviewSource};
///
/// let review = |name: &str, decision| {
///     AgentReview::new(name, decision, format!("{name} says"), ReviewSource::ServiceBacked, Utc::now())
/// };
/// let reviews = vec![
///     review("brand", ReviewDecision::MajorIssue),
///     review("seo", ReviewDecision::MinorIssue),
///     review("security", ReviewDecision::Approved),
/// ];
///
/// let vote = ConsensusVote::from_reviews(&reviews, 3).unwrap();
/// assert!(!vote.requires_redraft); // a single major issue is non-blocking
/// assert_eq!(vote.combined_feedback, "brand: brand says");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusVote {
    pub approved_count: usize,
    pub minor_issue_count: usize,
    pub major_issue_count: usize,
    pub requires_redraft: bool,
    /// Highest severity reported this round
    pub highest_severity: ReviewDecision,
    /// Feedback of every reviewer at the highest severity, `"{reviewer}: {feedback}"`
    pub combined_feedback: String,
    pub ballots: Vec<Ballot>,
}

impl ConsensusVote {
    /// Tally a full round of reviews.
    ///
    /// Fails with [`DomainError::QuorumIncomplete`] unless exactly `expected`
    /// reviews are supplied.
    pub fn from_reviews(reviews: &[AgentReview], expected: usize) -> Result<Self, DomainError> {
        if reviews.is_empty() || reviews.len() != expected {
            return Err(DomainError::QuorumIncomplete {
                expected,
                received: reviews.len(),
            });
        }

        let count = |d: ReviewDecision| reviews.iter().filter(|r| r.decision == d).count();
        let approved_count = count(ReviewDecision::Approved);
        let minor_issue_count = count(ReviewDecision::MinorIssue);
        let major_issue_count = count(ReviewDecision::MajorIssue);

        let highest_severity = reviews
            .iter()
            .map(|r| r.decision)
            .max()
            .unwrap_or(ReviewDecision::Approved);

        let combined_feedback = reviews
            .iter()
            .filter(|r| r.decision == highest_severity)
            .map(|r| format!("{}: {}", r.reviewer_name, r.feedback.trim()))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(Self {
            approved_count,
            minor_issue_count,
            major_issue_count,
            requires_redraft: major_issue_count >= REDRAFT_MAJOR_THRESHOLD,
            highest_severity,
            combined_feedback,
            ballots: reviews
                .iter()
                .map(|r| Ballot {
                    reviewer: r.reviewer_name.clone(),
                    decision: r.decision,
                })
                .collect(),
        })
    }

    pub fn total_votes(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_unanimous_approval(&self) -> bool {
        self.approved_count == self.total_votes()
    }

    /// Generate a visual vote summary (e.g., "[●◐○]")
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for ballot in &self.ballots {
            summary.push(ballot.decision.symbol());
        }
        summary.push(']');
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReviewSource;
    use chrono::Utc;

    fn review(name: &str, decision: ReviewDecision, feedback: &str) -> AgentReview {
        AgentReview::new(name, decision, feedback, ReviewSource::ServiceBacked, Utc::now())
    }

    fn vote(decisions: [ReviewDecision; 3]) -> ConsensusVote {
        let reviews: Vec<_> = decisions
            .iter()
            .enumerate()
            .map(|(i, d)| review(&format!("r{}", i), *d, "fb"))
            .collect();
        ConsensusVote::from_reviews(&reviews, 3).unwrap()
    }

    #[test]
    fn test_redraft_iff_two_or_more_major() {
        use ReviewDecision::*;
        let all = [Approved, MinorIssue, MajorIssue];
        for a in all {
            for b in all {
                for c in all {
                    let v = vote([a, b, c]);
                    let majors = [a, b, c].iter().filter(|d| d.is_major()).count();
                    assert_eq!(v.requires_redraft, majors >= 2, "{:?}", [a, b, c]);
                }
            }
        }
    }

    #[test]
    fn test_minor_only_majority_is_non_blocking() {
        use ReviewDecision::*;
        let v = vote([MinorIssue, MinorIssue, MinorIssue]);
        assert!(!v.requires_redraft);
        assert_eq!(v.highest_severity, MinorIssue);
        assert_eq!(v.minor_issue_count, 3);
    }

    #[test]
    fn test_combined_feedback_takes_highest_severity_only() {
        let reviews = vec![
            review("brand", ReviewDecision::MajorIssue, "Off-brand tone"),
            review("seo", ReviewDecision::MinorIssue, "Meta too short"),
            review("security", ReviewDecision::MajorIssue, "Contains an email address "),
        ];
        let v = ConsensusVote::from_reviews(&reviews, 3).unwrap();
        assert!(v.requires_redraft);
        assert_eq!(
            v.combined_feedback,
            "brand: Off-brand tone\n\nsecurity: Contains an email address"
        );
        assert!(!v.combined_feedback.contains("Meta too short"));
    }

    #[test]
    fn test_incomplete_quorum_is_rejected() {
        let reviews = vec![review("brand", ReviewDecision::Approved, "ok")];
        let err = ConsensusVote::from_reviews(&reviews, 3).unwrap_err();
        assert_eq!(
            err,
            DomainError::QuorumIncomplete {
                expected: 3,
                received: 1
            }
        );
        assert!(ConsensusVote::from_reviews(&[], 0).is_err());
    }

    #[test]
    fn test_vote_summary() {
        use ReviewDecision::*;
        let v = vote([Approved, MinorIssue, MajorIssue]);
        assert_eq!(v.vote_summary(), "[●◐○]");
        assert!(!vote([Approved, Approved, MinorIssue]).is_unanimous_approval());
        assert!(vote([Approved, Approved, Approved]).is_unanimous_approval());
    }
}
