//! Deterministic rule-based reviews
//!
//! Each rule set inspects a draft and returns findings. The verdict is the
//! highest finding severity, or approved when nothing is found. Rules never
//! fail, so a review round always completes.

mod brand;
mod compliance;
mod seo;

pub use brand::BrandToneRules;
pub use compliance::ComplianceRules;
pub use seo::SeoRules;

use review_domain::{ContentDraft, ReviewDecision, ReviewerKind};

/// One problem found by a rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFinding {
    pub severity: ReviewDecision,
    pub issue: String,
    pub suggestion: String,
}

impl RuleFinding {
    pub fn minor(issue: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            severity: ReviewDecision::MinorIssue,
            issue: issue.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn major(issue: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            severity: ReviewDecision::MajorIssue,
            issue: issue.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Outcome of applying one rule set to a draft
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation {
    pub kind: ReviewerKind,
    pub findings: Vec<RuleFinding>,
}

impl RuleEvaluation {
    pub fn new(kind: ReviewerKind, findings: Vec<RuleFinding>) -> Self {
        Self { kind, findings }
    }

    pub fn decision(&self) -> ReviewDecision {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(ReviewDecision::Approved)
    }

    pub fn issues(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.issue.clone()).collect()
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.suggestion.clone()).collect()
    }

    /// Headline followed by bulleted issues and suggestions
    pub fn feedback(&self) -> String {
        let name = self.kind.display_name();
        let headline = match self.decision() {
            ReviewDecision::Approved => format!("{} review passed with no issues.", name),
            ReviewDecision::MinorIssue => format!("{} review found minor issues.", name),
            ReviewDecision::MajorIssue => format!(
                "{} review found major issues that must be fixed before publication.",
                name
            ),
        };
        if self.findings.is_empty() {
            return headline;
        }

        let mut out = headline;
        out.push_str("\n\nIssues identified:");
        for finding in &self.findings {
            out.push_str(&format!("\n- {}", finding.issue));
        }
        out.push_str("\n\nSuggestions:");
        for finding in &self.findings {
            out.push_str(&format!("\n- {}", finding.suggestion));
        }
        out
    }
}

/// A deterministic rule set for one reviewer kind
pub trait ReviewRules: Send + Sync {
    fn kind(&self) -> ReviewerKind;

    /// Guidelines rendered for the service-backed assessment prompt
    fn guidelines(&self) -> String;

    fn evaluate(&self, draft: &ContentDraft) -> RuleEvaluation;

    /// Findings that must override any service-backed verdict
    fn hard_block(&self, _draft: &ContentDraft) -> Option<RuleEvaluation> {
        None
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use review_domain::{ContentDraft, DraftContent, DraftRequest};

    pub fn draft(title: &str, meta: Option<&str>, body: &str, keywords: &[&str]) -> ContentDraft {
        draft_in(title, meta, body, keywords, None)
    }

    pub fn draft_in(
        title: &str,
        meta: Option<&str>,
        body: &str,
        keywords: &[&str],
        category: Option<&str>,
    ) -> ContentDraft {
        let mut request =
            DraftRequest::new("topic", keywords.iter().map(|k| k.to_string()).collect()).unwrap();
        if let Some(category) = category {
            request = request.with_category(category);
        }
        let mut content = DraftContent::new(title, body);
        if let Some(meta) = meta {
            content = content.with_meta_description(meta);
        }
        ContentDraft::initial(&request, content, "test", Utc::now())
    }

    /// `n` words of neutral filler
    pub fn filler(n: usize) -> String {
        vec!["word"; n].join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_is_highest_severity() {
        let eval = RuleEvaluation::new(
            ReviewerKind::BrandTone,
            vec![
                RuleFinding::minor("a", "fix a"),
                RuleFinding::major("b", "fix b"),
            ],
        );
        assert_eq!(eval.decision(), ReviewDecision::MajorIssue);
        assert_eq!(
            RuleEvaluation::new(ReviewerKind::BrandTone, vec![]).decision(),
            ReviewDecision::Approved
        );
    }

    #[test]
    fn test_feedback_layout() {
        let eval = RuleEvaluation::new(
            ReviewerKind::MarketingSeo,
            vec![RuleFinding::minor("Meta too short", "Expand the meta description")],
        );
        assert_eq!(
            eval.feedback(),
            "SEO Marketing review found minor issues.\n\n\
             Issues identified:\n- Meta too short\n\n\
             Suggestions:\n- Expand the meta description"
        );
    }
}
