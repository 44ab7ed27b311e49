//! Draft evaluators
//!
//! Three reviewers judge every draft: brand tone, marketing/SEO and
//! security/compliance. Each one prefers a service-backed assessment and
//! falls back to its deterministic rules when the service is unavailable,
//! so [`Evaluator::review`] always yields a verdict.
//!
//! ```text
//! draft ──▶ hard_block? ──yes──▶ rule verdict
//!              │ no
//!              ▼
//!         service assess ──ok──▶ service verdict
//!              │ err
//!              ▼
//!         rule verdict (fallback)
//! ```

pub mod rules;
pub mod service;

pub use rules::{
    BrandToneRules, ComplianceRules, ReviewRules, RuleEvaluation, RuleFinding, SeoRules,
};
pub use service::ServiceAssessor;

use crate::config::ReviewGuidelines;
use crate::ports::clock::Clock;
use crate::providers::ProviderInvoker;
use async_trait::async_trait;
use review_domain::{AgentReview, ContentDraft, ReviewSource, ReviewerKind};
use std::sync::Arc;
use tracing::{debug, warn};

/// Confidence recorded when the service omits one
const DEFAULT_SERVICE_CONFIDENCE: f64 = 0.7;

#[async_trait]
pub trait Evaluator: Send + Sync {
    fn kind(&self) -> ReviewerKind;

    /// Review one draft version. Never fails.
    async fn review(&self, draft: &ContentDraft) -> AgentReview;
}

/// Evaluator backed by a rule set and, optionally, an assessment service
pub struct ReviewEvaluator {
    rules: Box<dyn ReviewRules>,
    service: Option<ServiceAssessor>,
    clock: Arc<dyn Clock>,
}

impl ReviewEvaluator {
    /// Evaluator that only ever applies its rules
    pub fn rule_based(rules: Box<dyn ReviewRules>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules,
            service: None,
            clock,
        }
    }

    pub fn with_service(mut self, service: ServiceAssessor) -> Self {
        self.service = Some(service);
        self
    }

    fn rule_review(&self, evaluation: RuleEvaluation) -> AgentReview {
        let kind = self.rules.kind();
        AgentReview::new(
            kind.reviewer_name(),
            evaluation.decision(),
            evaluation.feedback(),
            ReviewSource::RuleBasedFallback,
            self.clock.now(),
        )
        .with_confidence(kind.fallback_confidence())
        .with_issues(evaluation.issues())
        .with_suggestions(evaluation.suggestions())
    }
}

#[async_trait]
impl Evaluator for ReviewEvaluator {
    fn kind(&self) -> ReviewerKind {
        self.rules.kind()
    }

    async fn review(&self, draft: &ContentDraft) -> AgentReview {
        let kind = self.rules.kind();

        if let Some(blocked) = self.rules.hard_block(draft) {
            debug!(reviewer = kind.reviewer_name(), "Hard block applied");
            return self.rule_review(blocked);
        }

        let Some(service) = &self.service else {
            return self.rule_review(self.rules.evaluate(draft));
        };

        match service.assess(kind, draft, &self.rules.guidelines()).await {
            Ok(assessment) => AgentReview::new(
                kind.reviewer_name(),
                assessment.decision,
                assessment.feedback,
                ReviewSource::ServiceBacked,
                self.clock.now(),
            )
            .with_confidence(assessment.confidence.unwrap_or(DEFAULT_SERVICE_CONFIDENCE))
            .with_issues(assessment.issues)
            .with_suggestions(assessment.suggestions),
            Err(e) => {
                warn!(
                    reviewer = kind.reviewer_name(),
                    "Assessment service unavailable, using rules: {}", e
                );
                self.rule_review(self.rules.evaluate(draft))
            }
        }
    }
}

/// The standard three-reviewer panel.
///
/// With `invoker` set every reviewer is service-backed; without it the
/// panel runs on rules alone.
pub fn review_panel(
    guidelines: &ReviewGuidelines,
    invoker: Option<Arc<ProviderInvoker>>,
    clock: Arc<dyn Clock>,
) -> Vec<Arc<dyn Evaluator>> {
    let rule_sets: Vec<Box<dyn ReviewRules>> = vec![
        Box::new(BrandToneRules::new(guidelines.brand.clone())),
        Box::new(SeoRules::new(guidelines.seo.clone())),
        Box::new(ComplianceRules::new(guidelines.compliance.clone())),
    ];

    rule_sets
        .into_iter()
        .map(|rules| {
            let mut evaluator = ReviewEvaluator::rule_based(rules, Arc::clone(&clock));
            if let Some(invoker) = &invoker {
                evaluator = evaluator.with_service(ServiceAssessor::new(Arc::clone(invoker)));
            }
            Arc::new(evaluator) as Arc<dyn Evaluator>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::rules::fixtures::{draft, filler};
    use super::*;
    use crate::config::ResilienceSettings;
    use crate::ports::completion_provider::CompletionProvider;
    use crate::resilience::{CircuitBreakerRegistry, ResilienceExecutor};
    use crate::testing::{ManualClock, ScriptedProvider};
    use review_domain::{ErrorCategory, ReviewDecision};

    fn invoker(provider: Arc<dyn CompletionProvider>) -> Arc<ProviderInvoker> {
        Arc::new(ProviderInvoker::new(
            vec![provider],
            ResilienceExecutor::new(Arc::new(CircuitBreakerRegistry::default())),
            &ResilienceSettings::default(),
        ))
    }

    fn evaluator(rules: Box<dyn ReviewRules>, provider: Option<Arc<dyn CompletionProvider>>) -> ReviewEvaluator {
        let e = ReviewEvaluator::rule_based(rules, Arc::new(ManualClock::default()));
        match provider {
            Some(p) => e.with_service(ServiceAssessor::new(invoker(p))),
            None => e,
        }
    }

    const APPROVED_JSON: &str = r#"{"decision": "approved", "feedback": "Looks good.", "confidence": 0.9}"#;

    #[tokio::test(start_paused = true)]
    async fn test_service_verdict_is_used() {
        let provider = ScriptedProvider::always("svc", APPROVED_JSON);
        let e = evaluator(
            Box::new(SeoRules::new(Default::default())),
            Some(provider.arc()),
        );
        // Rules alone would flag the missing meta description
        let review = e.review(&draft("Title", None, "short", &[])).await;
        assert_eq!(review.reviewer_name, "marketing_seo");
        assert_eq!(review.decision, ReviewDecision::Approved);
        assert_eq!(review.source, ReviewSource::ServiceBacked);
        assert_eq!(review.confidence, 0.9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_failure_falls_back_to_rules() {
        let provider = ScriptedProvider::always_failing("svc", ErrorCategory::ServerError);
        let e = evaluator(
            Box::new(SeoRules::new(Default::default())),
            Some(provider.arc()),
        );
        let review = e.review(&draft("Title", None, "short", &[])).await;
        assert_eq!(review.source, ReviewSource::RuleBasedFallback);
        assert_eq!(review.decision, ReviewDecision::MinorIssue);
        assert_eq!(review.confidence, ReviewerKind::MarketingSeo.fallback_confidence());
        assert!(!review.issues_found.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unparseable_service_answer_falls_back() {
        let provider = ScriptedProvider::always("svc", "I think it is fine!");
        let e = evaluator(
            Box::new(BrandToneRules::new(Default::default())),
            Some(provider.arc()),
        );
        let review = e.review(&draft("Title", None, &filler(700), &[])).await;
        assert!(review.is_fallback());
        // Validation failures are retried once
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sensitive_data_blocks_even_when_service_approves() {
        let provider = ScriptedProvider::always("svc", APPROVED_JSON);
        let e = evaluator(
            Box::new(ComplianceRules::new(Default::default())),
            Some(provider.arc()),
        );
        let review = e
            .review(&draft("Title", None, "Call 123-45-6789 to order.", &[]))
            .await;
        assert_eq!(review.decision, ReviewDecision::MajorIssue);
        assert_eq!(review.source, ReviewSource::RuleBasedFallback);
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_panel_has_one_reviewer_per_kind() {
        let panel = review_panel(
            &ReviewGuidelines::default(),
            None,
            Arc::new(ManualClock::default()),
        );
        let kinds: Vec<_> = panel.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, ReviewerKind::ALL.to_vec());
    }
}
