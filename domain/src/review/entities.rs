//! Review entities

use super::decision::{ReviewDecision, ReviewSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The verdict of one evaluator on one draft version.
///
/// Created once per evaluator per review round and never modified after the
/// round's vote is computed.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use review_domain::review::{AgentReview, ReviewDecision, ReviewSource};
///
/// let review = AgentReview::new(
///     "brand_tone",
///     ReviewDecision::MinorIssue,
///     "Brand keywords are missing.",
///     ReviewSource::RuleBasedFallback,
///     Utc::now(),
/// )
/// .with_confidence(1.4);
/// assert_eq!(review.confidence, 1.0);
/// assert!(review.is_fallback());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReview {
    pub reviewer_name: String,
    pub decision: ReviewDecision,
    pub feedback: String,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub source: ReviewSource,
    #[serde(default)]
    pub issues_found: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl AgentReview {
    pub fn new(
        reviewer_name: impl Into<String>,
        decision: ReviewDecision,
        feedback: impl Into<String>,
        source: ReviewSource,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            reviewer_name: reviewer_name.into(),
            decision,
            feedback: feedback.into(),
            confidence: 0.5,
            source,
            issues_found: Vec::new(),
            suggestions: Vec::new(),
            timestamp,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_issues(mut self, issues: Vec<String>) -> Self {
        self.issues_found = issues;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ReviewSource::RuleBasedFallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        let now = Utc::now();
        let low = AgentReview::new("a", ReviewDecision::Approved, "", ReviewSource::ServiceBacked, now)
            .with_confidence(-0.3);
        assert_eq!(low.confidence, 0.0);
        let nan = AgentReview::new("a", ReviewDecision::Approved, "", ReviewSource::ServiceBacked, now)
            .with_confidence(f64::NAN);
        assert_eq!(nan.confidence, 0.0);
    }

    #[test]
    fn test_review_serializes_source_and_decision() {
        let review = AgentReview::new(
            "seo",
            ReviewDecision::MajorIssue,
            "Title too long",
            ReviewSource::ServiceBacked,
            Utc::now(),
        )
        .with_issues(vec!["title is 75 characters".into()]);
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["decision"], "major_issue");
        assert_eq!(json["source"], "service_backed");
        assert_eq!(json["issues_found"][0], "title is 75 characters");
        assert!(!review.is_fallback());
    }
}
