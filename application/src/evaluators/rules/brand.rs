//! Brand voice rules

use super::{ReviewRules, RuleEvaluation, RuleFinding};
use crate::config::BrandGuidelines;
use review_domain::core::text;
use review_domain::{ContentDraft, ReviewerKind};

pub struct BrandToneRules {
    guidelines: BrandGuidelines,
}

impl BrandToneRules {
    pub fn new(guidelines: BrandGuidelines) -> Self {
        Self { guidelines }
    }
}

impl ReviewRules for BrandToneRules {
    fn kind(&self) -> ReviewerKind {
        ReviewerKind::BrandTone
    }

    fn guidelines(&self) -> String {
        self.guidelines.summary()
    }

    fn evaluate(&self, draft: &ContentDraft) -> RuleEvaluation {
        let content = draft.full_text();
        let mut findings = Vec::new();

        let keywords = &self.guidelines.brand_keywords;
        if !keywords.is_empty() && !keywords.iter().any(|k| text::contains_ci(&content, k)) {
            findings.push(RuleFinding::minor(
                "Brand keywords are missing",
                format!("Work in at least one of: {}", keywords.join(", ")),
            ));
        }

        if self.guidelines.is_luxury_voice() {
            let words = text::words(&content);
            // Whole-word match so "basic" does not flag "basically"
            let offending: Vec<&str> = self
                .guidelines
                .discouraged_terms
                .iter()
                .filter(|t| {
                    if t.contains(char::is_whitespace) || t.contains('-') {
                        text::contains_ci(&content, t)
                    } else {
                        words.iter().any(|w| w.eq_ignore_ascii_case(t))
                    }
                })
                .map(String::as_str)
                .collect();
            if !offending.is_empty() {
                findings.push(RuleFinding::major(
                    format!(
                        "Tone inconsistent with a luxury brand voice: {}",
                        offending.join(", ")
                    ),
                    "Replace price-led vocabulary with language about craft, quality and exclusivity",
                ));
            }
        }

        let words = draft.word_count();
        if words < self.guidelines.min_word_count {
            findings.push(RuleFinding::minor(
                format!(
                    "Content is too short ({} words, minimum {})",
                    words, self.guidelines.min_word_count
                ),
                "Expand the story with product detail and brand heritage",
            ));
        }

        RuleEvaluation::new(self.kind(), findings)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{draft, filler};
    use super::*;
    use review_domain::ReviewDecision;

    fn rules() -> BrandToneRules {
        BrandToneRules::new(BrandGuidelines {
            brand_keywords: vec!["SkyRose".into()],
            ..Default::default()
        })
    }

    #[test]
    fn test_on_brand_long_draft_is_approved() {
        let body = format!("The SkyRose atelier presents {}", filler(620));
        let eval = rules().evaluate(&draft("Title", None, &body, &[]));
        assert_eq!(eval.decision(), ReviewDecision::Approved);
        assert!(eval.findings.is_empty());
    }

    #[test]
    fn test_discouraged_terms_are_major_for_luxury_voice() {
        let body = format!("SkyRose cheap deals {}", filler(620));
        let eval = rules().evaluate(&draft("Title", None, &body, &[]));
        assert_eq!(eval.decision(), ReviewDecision::MajorIssue);
        assert!(eval.issues()[0].contains("cheap"));
    }

    #[test]
    fn test_discouraged_terms_allowed_without_luxury_value() {
        let rules = BrandToneRules::new(BrandGuidelines {
            values: vec!["value".into()],
            ..Default::default()
        });
        let body = format!("cheap and cheerful {}", filler(620));
        let eval = rules.evaluate(&draft("Title", None, &body, &[]));
        assert_eq!(eval.decision(), ReviewDecision::Approved);
    }

    #[test]
    fn test_short_and_missing_keywords_are_minor() {
        let eval = rules().evaluate(&draft("Title", None, "A short piece.", &[]));
        assert_eq!(eval.decision(), ReviewDecision::MinorIssue);
        assert_eq!(eval.findings.len(), 2);
        assert!(eval.feedback().contains("Brand keywords are missing"));
    }
}
