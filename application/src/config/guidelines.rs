//! Review guidelines
//!
//! The same guidelines drive both execution strategies of each evaluator:
//! they are rendered into the service-backed assessment prompt and applied
//! directly by the rule-based fallback. Each set deserializes from its own
//! configuration section with every field optional.

use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Brand voice guidelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandGuidelines {
    pub brand_name: Option<String>,
    /// At least one must appear in the draft
    pub brand_keywords: Vec<String>,
    /// Brand values; containing "luxury" enables luxury-voice checks
    pub values: Vec<String>,
    /// Vocabulary inconsistent with a luxury voice
    pub discouraged_terms: Vec<String>,
    /// Vocabulary that signals the intended voice
    pub preferred_terms: Vec<String>,
    pub min_word_count: usize,
}

impl Default for BrandGuidelines {
    fn default() -> Self {
        Self {
            brand_name: None,
            brand_keywords: Vec::new(),
            values: strings(&["luxury", "craftsmanship", "heritage"]),
            discouraged_terms: strings(&["cheap", "discount", "basic"]),
            preferred_terms: strings(&[
                "exclusive",
                "elegant",
                "premium",
                "sophisticated",
                "crafted",
                "timeless",
                "refined",
                "exceptional",
            ]),
            min_word_count: 600,
        }
    }
}

impl BrandGuidelines {
    pub fn is_luxury_voice(&self) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case("luxury"))
    }

    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if let Some(name) = &self.brand_name {
            lines.push(format!("- Brand: {}", name));
        }
        if !self.brand_keywords.is_empty() {
            lines.push(format!(
                "- Must mention at least one of: {}",
                self.brand_keywords.join(", ")
            ));
        }
        if !self.values.is_empty() {
            lines.push(format!("- Brand values: {}", self.values.join(", ")));
        }
        if self.is_luxury_voice() && !self.discouraged_terms.is_empty() {
            lines.push(format!(
                "- Avoid vocabulary that cheapens the brand: {}",
                self.discouraged_terms.join(", ")
            ));
        }
        lines.push(format!("- Minimum length: {} words", self.min_word_count));
        lines.join("\n")
    }
}

/// Search and conversion guidelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoGuidelines {
    pub meta_min_chars: usize,
    pub meta_max_chars: usize,
    pub title_max_chars: usize,
    /// Occurrences per word above which a keyword counts as stuffed
    pub max_keyword_density: f64,
    pub cta_phrases: Vec<String>,
}

impl Default for SeoGuidelines {
    fn default() -> Self {
        Self {
            meta_min_chars: 120,
            meta_max_chars: 160,
            title_max_chars: 60,
            max_keyword_density: 0.03,
            cta_phrases: strings(&[
                "learn more",
                "shop now",
                "discover",
                "explore",
                "get started",
                "contact us",
            ]),
        }
    }
}

impl SeoGuidelines {
    pub fn summary(&self) -> String {
        format!(
            "- Title at most {} characters\n\
             - Meta description between {} and {} characters\n\
             - Every target keyword present, density at most {:.1}%\n\
             - Include a call to action such as: {}",
            self.title_max_chars,
            self.meta_min_chars,
            self.meta_max_chars,
            self.max_keyword_density * 100.0,
            self.cta_phrases.join(", ")
        )
    }
}

/// Security and regulatory guidelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceGuidelines {
    pub standards: Vec<String>,
    pub sensitive_terms: Vec<String>,
    pub claim_terms: Vec<String>,
    pub regulated_topics: Vec<String>,
    /// Values of the draft's `category` metadata that require a disclaimer
    pub regulated_categories: Vec<String>,
    pub disclaimer_markers: Vec<String>,
}

impl Default for ComplianceGuidelines {
    fn default() -> Self {
        Self {
            standards: strings(&["GDPR"]),
            sensitive_terms: strings(&[
                "password",
                "api key",
                "secret",
                "token",
                "credit card",
                "ssn",
                "social security",
            ]),
            claim_terms: strings(&["guaranteed", "100%", "proven", "scientific"]),
            regulated_topics: strings(&[
                "medical",
                "diagnosis",
                "investment",
                "financial advice",
            ]),
            regulated_categories: strings(&["health", "finance"]),
            disclaimer_markers: strings(&["consult", "professional", "disclaimer"]),
        }
    }
}

impl ComplianceGuidelines {
    pub fn summary(&self) -> String {
        format!(
            "- Standards: {}\n\
             - No sensitive data ({} or personal identifiers such as e-mail addresses)\n\
             - Claims like {} need a disclaimer\n\
             - Regulated topics ({}) and categories ({}) need a consult-a-professional disclaimer",
            self.standards.join(", "),
            self.sensitive_terms.join(", "),
            self.claim_terms.join(", "),
            self.regulated_topics.join(", "),
            self.regulated_categories.join(", ")
        )
    }
}

/// All evaluator guidelines
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReviewGuidelines {
    pub brand: BrandGuidelines,
    pub seo: SeoGuidelines,
    pub compliance: ComplianceGuidelines,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luxury_voice_detection() {
        assert!(BrandGuidelines::default().is_luxury_voice());
        let plain = BrandGuidelines {
            values: vec!["value".into()],
            ..Default::default()
        };
        assert!(!plain.is_luxury_voice());
        assert!(!plain.summary().contains("Avoid vocabulary"));
    }

    #[test]
    fn test_summaries_mention_limits() {
        let seo = SeoGuidelines::default().summary();
        assert!(seo.contains("at most 60 characters"));
        assert!(seo.contains("between 120 and 160"));
        assert!(seo.contains("3.0%"));
        let compliance = ComplianceGuidelines::default().summary();
        assert!(compliance.contains("GDPR"));
        assert!(compliance.contains("health, finance"));
    }
}
