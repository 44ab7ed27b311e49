//! Search and conversion rules

use super::{ReviewRules, RuleEvaluation, RuleFinding};
use crate::config::SeoGuidelines;
use review_domain::core::text;
use review_domain::{ContentDraft, ReviewerKind};

pub struct SeoRules {
    guidelines: SeoGuidelines,
}

impl SeoRules {
    pub fn new(guidelines: SeoGuidelines) -> Self {
        Self { guidelines }
    }

    fn check_meta(&self, draft: &ContentDraft, findings: &mut Vec<RuleFinding>) {
        let g = &self.guidelines;
        let Some(meta) = draft.meta_description() else {
            findings.push(RuleFinding::minor(
                "Meta description is missing",
                format!(
                    "Add a meta description of {}-{} characters",
                    g.meta_min_chars, g.meta_max_chars
                ),
            ));
            return;
        };
        let len = meta.chars().count();
        if len < g.meta_min_chars {
            findings.push(RuleFinding::minor(
                format!("Meta description too short ({} characters)", len),
                format!("Expand the meta description to at least {} characters", g.meta_min_chars),
            ));
        } else if len > g.meta_max_chars {
            findings.push(RuleFinding::major(
                format!("Meta description too long ({} characters)", len),
                format!("Trim the meta description to {} characters or fewer", g.meta_max_chars),
            ));
        }
    }

    fn check_keywords(&self, draft: &ContentDraft, findings: &mut Vec<RuleFinding>) {
        let content = draft.full_text();
        let missing: Vec<&str> = draft
            .keywords()
            .iter()
            .filter(|k| !text::contains_ci(&content, k))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            findings.push(RuleFinding::minor(
                format!("Target keywords missing: {}", missing.join(", ")),
                "Use every target keyword naturally in the body",
            ));
        }

        let words = draft.word_count();
        if words == 0 {
            return;
        }
        for keyword in draft.keywords() {
            let density = text::occurrences_ci(draft.body(), keyword) as f64 / words as f64;
            if density > self.guidelines.max_keyword_density {
                findings.push(RuleFinding::minor(
                    format!(
                        "Keyword '{}' is overused ({:.1}% density)",
                        keyword,
                        density * 100.0
                    ),
                    format!(
                        "Reduce '{}' to at most {:.1}% of the text",
                        keyword,
                        self.guidelines.max_keyword_density * 100.0
                    ),
                ));
            }
        }
    }
}

impl ReviewRules for SeoRules {
    fn kind(&self) -> ReviewerKind {
        ReviewerKind::MarketingSeo
    }

    fn guidelines(&self) -> String {
        self.guidelines.summary()
    }

    fn evaluate(&self, draft: &ContentDraft) -> RuleEvaluation {
        let mut findings = Vec::new();
        self.check_meta(draft, &mut findings);
        self.check_keywords(draft, &mut findings);

        let title_len = draft.title().chars().count();
        if title_len > self.guidelines.title_max_chars {
            findings.push(RuleFinding::major(
                format!("Title too long ({} characters)", title_len),
                format!(
                    "Shorten the title to {} characters or fewer",
                    self.guidelines.title_max_chars
                ),
            ));
        }

        let has_cta = self
            .guidelines
            .cta_phrases
            .iter()
            .any(|cta| text::contains_ci(draft.body(), cta));
        if !has_cta {
            findings.push(RuleFinding::minor(
                "No call to action",
                format!(
                    "Close with a call to action such as '{}'",
                    self.guidelines
                        .cta_phrases
                        .first()
                        .map(String::as_str)
                        .unwrap_or("learn more")
                ),
            ));
        }

        RuleEvaluation::new(self.kind(), findings)
    }
}
