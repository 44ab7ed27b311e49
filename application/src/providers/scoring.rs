//! Deterministic ranking of round-table responses

use super::invoker::ProviderResult;
use crate::config::BrandGuidelines;
use review_domain::core::text;
use std::collections::HashSet;
use std::time::Duration;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "and", "or", "but", "in", "on",
    "at", "to", "for", "of", "with", "about",
];

/// Per-metric scores, each 0–100
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResponseScores {
    pub relevance: f64,
    pub quality: f64,
    pub brand_alignment: f64,
    pub efficiency: f64,
}

impl ResponseScores {
    /// Weighted total, 0–100
    pub fn total(&self) -> f64 {
        self.relevance * 0.35 + self.quality * 0.25 + self.brand_alignment * 0.25 + self.efficiency * 0.15
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedResponse {
    /// 1 is best
    pub rank: usize,
    pub result: ProviderResult,
    pub scores: ResponseScores,
}

/// Scores responses against the prompt and the brand vocabulary
pub struct ResponseScorer {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl ResponseScorer {
    pub fn new(brand: &BrandGuidelines) -> Self {
        let positive = brand
            .preferred_terms
            .iter()
            .chain(brand.values.iter())
            .map(|t| t.to_lowercase())
            .collect();
        Self {
            positive,
            negative: brand.discouraged_terms.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    pub fn score(&self, prompt: &str, result: &ProviderResult) -> ResponseScores {
        if result.content.trim().is_empty() {
            return ResponseScores::default();
        }
        ResponseScores {
            relevance: relevance(prompt, &result.content),
            quality: quality(&result.content),
            brand_alignment: self.brand_alignment(&result.content),
            efficiency: efficiency(result.latency),
        }
    }

    /// Rank by total score; ties keep provider order
    pub fn rank(&self, prompt: &str, results: Vec<ProviderResult>) -> Vec<RankedResponse> {
        let mut scored: Vec<_> = results
            .into_iter()
            .map(|result| {
                let scores = self.score(prompt, &result);
                (scores, result)
            })
            .collect();
        scored.sort_by(|(a, _), (b, _)| b.total().total_cmp(&a.total()));
        scored
            .into_iter()
            .enumerate()
            .map(|(i, (scores, result))| RankedResponse {
                rank: i + 1,
                result,
                scores,
            })
            .collect()
    }

    fn brand_alignment(&self, content: &str) -> f64 {
        let lower = content.to_lowercase();
        let positive = self.positive.iter().filter(|t| lower.contains(t.as_str())).count();
        let negative = self.negative.iter().filter(|t| lower.contains(t.as_str())).count();
        (50.0 + positive as f64 * 4.0 - negative as f64 * 8.0).clamp(0.0, 100.0)
    }
}

fn content_words(text: &str) -> HashSet<String> {
    text::words(text)
        .into_iter()
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn relevance(prompt: &str, content: &str) -> f64 {
    let prompt_words = content_words(prompt);
    if prompt_words.is_empty() {
        return 50.0;
    }
    let content_words = content_words(content);
    let overlap = prompt_words.intersection(&content_words).count();
    (overlap as f64 / prompt_words.len() as f64 * 100.0).clamp(0.0, 100.0)
}

fn quality(content: &str) -> f64 {
    let words = text::word_count(content);
    let mut score: f64 = 50.0;
    score += match words {
        0..50 => -10.0,
        50..=500 => 25.0,
        _ => 15.0,
    };
    if content.contains("\n\n") {
        score += 5.0;
    }
    if ["1.", "- ", "* ", "•"].iter().any(|m| content.contains(m)) {
        score += 5.0;
    }
    if ["##", "**"].iter().any(|m| content.contains(m)) {
        score += 3.0;
    }
    if content.matches("...").count() > 5 {
        score -= 10.0;
    }
    score.clamp(0.0, 100.0)
}

fn efficiency(latency: Duration) -> f64 {
    match latency.as_millis() {
        0..1000 => 100.0,
        1000..3000 => 90.0,
        3000..5000 => 70.0,
        5000..10000 => 50.0,
        _ => 30.0,
    }
}
