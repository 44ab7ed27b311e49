//! Review decision value objects

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Verdict of one evaluator on one draft version.
///
/// Variants are ordered by severity, so `max()` over a set of decisions
/// yields the highest reported severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    MinorIssue,
    MajorIssue,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Approved => "approved",
            ReviewDecision::MinorIssue => "minor_issue",
            ReviewDecision::MajorIssue => "major_issue",
        }
    }

    pub fn is_major(&self) -> bool {
        matches!(self, ReviewDecision::MajorIssue)
    }

    /// Glyph used in vote summaries
    pub fn symbol(&self) -> char {
        match self {
            ReviewDecision::Approved => '●',
            ReviewDecision::MinorIssue => '◐',
            ReviewDecision::MajorIssue => '○',
        }
    }
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReviewDecision {
    type Err = String;

    /// Accepts the canonical names plus the short forms models tend to emit
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "approved" | "approve" | "pass" => Ok(ReviewDecision::Approved),
            "minor_issue" | "minor" | "minor_issues" => Ok(ReviewDecision::MinorIssue),
            "major_issue" | "major" | "major_issues" | "reject" | "rejected" => {
                Ok(ReviewDecision::MajorIssue)
            }
            other => Err(format!("unknown review decision: {}", other)),
        }
    }
}

/// Which execution strategy produced a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSource {
    ServiceBacked,
    RuleBasedFallback,
}

impl ReviewSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewSource::ServiceBacked => "service_backed",
            ReviewSource::RuleBasedFallback => "rule_based_fallback",
        }
    }
}

impl std::fmt::Display for ReviewSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three evaluator capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerKind {
    BrandTone,
    MarketingSeo,
    SecurityCompliance,
}

impl ReviewerKind {
    pub const ALL: [ReviewerKind; 3] = [
        ReviewerKind::BrandTone,
        ReviewerKind::MarketingSeo,
        ReviewerKind::SecurityCompliance,
    ];

    /// Stable name recorded as `reviewer_name` on every review
    pub fn reviewer_name(&self) -> &'static str {
        match self {
            ReviewerKind::BrandTone => "brand_tone",
            ReviewerKind::MarketingSeo => "marketing_seo",
            ReviewerKind::SecurityCompliance => "security_compliance",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReviewerKind::BrandTone => "Brand Intelligence",
            ReviewerKind::MarketingSeo => "SEO Marketing",
            ReviewerKind::SecurityCompliance => "Security & Compliance",
        }
    }

    /// Confidence recorded on rule-based verdicts
    pub fn fallback_confidence(&self) -> f64 {
        match self {
            ReviewerKind::BrandTone => 0.75,
            ReviewerKind::MarketingSeo => 0.80,
            ReviewerKind::SecurityCompliance => 0.85,
        }
    }
}

impl std::fmt::Display for ReviewerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reviewer_name())
    }
}

impl FromStr for ReviewerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReviewerKind::ALL
            .into_iter()
            .find(|k| k.reviewer_name() == s.trim())
            .ok_or_else(|| format!("unknown reviewer: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_ordering_is_severity() {
        assert!(ReviewDecision::MajorIssue > ReviewDecision::MinorIssue);
        assert!(ReviewDecision::MinorIssue > ReviewDecision::Approved);
        let highest = [
            ReviewDecision::Approved,
            ReviewDecision::MajorIssue,
            ReviewDecision::MinorIssue,
        ]
        .into_iter()
        .max();
        assert_eq!(highest, Some(ReviewDecision::MajorIssue));
    }

    #[test]
    fn test_decision_from_str_variants() {
        assert_eq!("approved".parse(), Ok(ReviewDecision::Approved));
        assert_eq!("Minor Issue".parse(), Ok(ReviewDecision::MinorIssue));
        assert_eq!("major-issue".parse(), Ok(ReviewDecision::MajorIssue));
        assert!("maybe".parse::<ReviewDecision>().is_err());
    }

    #[test]
    fn test_decision_serde_snake_case() {
        let json = serde_json::to_string(&ReviewDecision::MinorIssue).unwrap();
        assert_eq!(json, "\"minor_issue\"");
        let source = serde_json::to_string(&ReviewSource::RuleBasedFallback).unwrap();
        assert_eq!(source, "\"rule_based_fallback\"");
    }

    #[test]
    fn test_reviewer_kind_roundtrip_by_name() {
        for kind in ReviewerKind::ALL {
            assert_eq!(kind.reviewer_name().parse(), Ok(kind));
        }
        assert_eq!(ReviewerKind::SecurityCompliance.fallback_confidence(), 0.85);
    }
}
