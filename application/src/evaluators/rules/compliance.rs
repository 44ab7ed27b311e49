//! Security and compliance rules

use super::{ReviewRules, RuleEvaluation, RuleFinding};
use crate::config::ComplianceGuidelines;
use regex::Regex;
use review_domain::core::text;
use review_domain::{ContentDraft, ReviewerKind};
use std::sync::LazyLock;

// Value patterns for personal data (compiled once)
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
});

static SSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid SSN pattern"));

static CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{4}[ -]?){3}\d{1,4}\b").expect("valid card number pattern")
});

pub struct ComplianceRules {
    guidelines: ComplianceGuidelines,
}

impl ComplianceRules {
    pub fn new(guidelines: ComplianceGuidelines) -> Self {
        Self { guidelines }
    }

    /// Sensitive terms and personal-data patterns found in the draft
    fn sensitive_data(&self, content: &str) -> Vec<String> {
        let words = text::words(content);
        let mut found: Vec<String> = self
            .guidelines
            .sensitive_terms
            .iter()
            .filter(|term| {
                if term.contains(char::is_whitespace) {
                    text::contains_ci(content, term)
                } else {
                    words.iter().any(|w| w.eq_ignore_ascii_case(term))
                }
            })
            .cloned()
            .collect();

        for (label, pattern) in [
            ("e-mail address", &*EMAIL_RE),
            ("social security number", &*SSN_RE),
            ("card number", &*CARD_RE),
        ] {
            if pattern.is_match(content) {
                found.push(label.to_string());
            }
        }
        found
    }

    fn has_disclaimer(&self, content: &str) -> bool {
        self.guidelines
            .disclaimer_markers
            .iter()
            .any(|m| text::contains_ci(content, m))
    }

    fn sensitive_finding(found: &[String]) -> RuleFinding {
        RuleFinding::major(
            format!("Sensitive data detected: {}", found.join(", ")),
            "Remove credentials and personal identifiers from the content",
        )
    }
}

impl ReviewRules for ComplianceRules {
    fn kind(&self) -> ReviewerKind {
        ReviewerKind::SecurityCompliance
    }

    fn guidelines(&self) -> String {
        self.guidelines.summary()
    }

    fn evaluate(&self, draft: &ContentDraft) -> RuleEvaluation {
        let content = draft.full_text();
        let disclaimed = self.has_disclaimer(&content);
        let mut findings = Vec::new();

        let sensitive = self.sensitive_data(&content);
        if !sensitive.is_empty() {
            findings.push(Self::sensitive_finding(&sensitive));
        }

        let claims: Vec<&str> = self
            .guidelines
            .claim_terms
            .iter()
            .filter(|c| text::contains_ci(&content, c))
            .map(String::as_str)
            .collect();
        if !claims.is_empty() && !disclaimed {
            findings.push(RuleFinding::minor(
                format!("Unsubstantiated claims without disclaimer: {}", claims.join(", ")),
                "Substantiate the claims or add a disclaimer",
            ));
        }

        let topics: Vec<&str> = self
            .guidelines
            .regulated_topics
            .iter()
            .filter(|t| text::contains_ci(&content, t))
            .map(String::as_str)
            .collect();
        let regulated_category = draft.category().filter(|c| {
            self.guidelines
                .regulated_categories
                .iter()
                .any(|r| r.eq_ignore_ascii_case(c))
        });
        if (!topics.is_empty() || regulated_category.is_some()) && !disclaimed {
            let subject = match regulated_category {
                Some(category) if topics.is_empty() => format!("regulated category '{}'", category),
                Some(category) => format!("regulated category '{}' ({})", category, topics.join(", ")),
                None => format!("regulated topics ({})", topics.join(", ")),
            };
            findings.push(RuleFinding::major(
                format!("Missing required disclaimer for {}", subject),
                "Add a disclaimer advising readers to consult a qualified professional",
            ));
        }

        RuleEvaluation::new(self.kind(), findings)
    }

    fn hard_block(&self, draft: &ContentDraft) -> Option<RuleEvaluation> {
        let sensitive = self.sensitive_data(&draft.full_text());
        if sensitive.is_empty() {
            return None;
        }
        Some(RuleEvaluation::new(
            self.kind(),
            vec![Self::sensitive_finding(&sensitive)],
        ))
    }
}
