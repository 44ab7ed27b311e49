//! Scripted collaborators for unit tests

use crate::evaluators::Evaluator;
use crate::ports::audit_logger::{AuditEvent, AuditLogger};
use crate::ports::clock::Clock;
use crate::ports::completion_provider::{CompletionProvider, CompletionRequest};
use crate::ports::draft_generator::{DraftGenerationError, DraftGenerator};
use crate::ports::event_sink::WorkflowEventSink;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use review_domain::{
    AgentReview, CallError, ContentDraft, DraftContent, DraftRequest, ErrorCategory,
    ReviewDecision, ReviewSource, ReviewerKind, WorkflowEvent,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Provider returning a fixed answer or a fixed failure
#[derive(Clone)]
pub struct ScriptedProvider {
    name: String,
    outcome: Result<String, ErrorCategory>,
    calls: Arc<AtomicU32>,
}

impl ScriptedProvider {
    pub fn always(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: Ok(content.to_string()),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn always_failing(name: &str, category: ErrorCategory) -> Self {
        Self {
            name: name.to_string(),
            outcome: Err(category),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn arc(&self) -> Arc<dyn CompletionProvider> {
        Arc::new(self.clone())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome
            .clone()
            .map_err(|category| CallError::new(&self.name, category, "scripted failure"))
    }
}

/// Wall clock advanced by hand
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Draft generator producing numbered drafts; can be told to fail
#[derive(Default)]
pub struct ScriptedDraftGenerator {
    generated: AtomicU32,
    failures_remaining: AtomicU32,
    feedback: Mutex<Vec<String>>,
}

impl ScriptedDraftGenerator {
    /// Fail the next `n` calls
    pub fn fail_next(&self, n: u32) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u32 {
        self.generated.load(Ordering::SeqCst)
    }

    /// Feedback passed to each redraft, in order
    pub fn feedback_seen(&self) -> Vec<String> {
        self.feedback.lock().unwrap().clone()
    }

    fn next(&self) -> Result<DraftContent, DraftGenerationError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(DraftGenerationError::Other("generator offline".to_string()));
        }
        let n = self.generated.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(DraftContent::new(format!("Draft {n}"), format!("Body of draft {n}.")))
    }
}

#[async_trait]
impl DraftGenerator for ScriptedDraftGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _request: &DraftRequest) -> Result<DraftContent, DraftGenerationError> {
        self.next()
    }

    async fn redraft(
        &self,
        _request: &DraftRequest,
        _previous: &ContentDraft,
        feedback: &str,
    ) -> Result<DraftContent, DraftGenerationError> {
        self.feedback.lock().unwrap().push(feedback.to_string());
        self.next()
    }
}

/// Evaluator returning a scripted decision per round; the last one repeats
pub struct ScriptedEvaluator {
    kind: ReviewerKind,
    decisions: Vec<ReviewDecision>,
    calls: AtomicU32,
}

impl ScriptedEvaluator {
    pub fn new(kind: ReviewerKind, decisions: &[ReviewDecision]) -> Self {
        Self {
            kind,
            decisions: decisions.to_vec(),
            calls: AtomicU32::new(0),
        }
    }

    /// One evaluator per kind, each with the given per-round script
    pub fn panel(scripts: [&[ReviewDecision]; 3]) -> Vec<Arc<dyn Evaluator>> {
        ReviewerKind::ALL
            .into_iter()
            .zip(scripts)
            .map(|(kind, script)| Arc::new(Self::new(kind, script)) as Arc<dyn Evaluator>)
            .collect()
    }
}

#[async_trait]
impl Evaluator for ScriptedEvaluator {
    fn kind(&self) -> ReviewerKind {
        self.kind
    }

    async fn review(&self, draft: &ContentDraft) -> AgentReview {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        let decision = self.decisions[call.min(self.decisions.len() - 1)];
        AgentReview::new(
            self.kind.reviewer_name(),
            decision,
            format!("{} on v{}", decision.as_str(), draft.version()),
            ReviewSource::ServiceBacked,
            draft.created_at(),
        )
        .with_confidence(0.9)
    }
}

#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<WorkflowEvent>>,
    delay: Option<std::time::Duration>,
}

impl RecordingEventSink {
    /// Sink that takes `delay` to deliver each event
    pub fn delayed(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowEventSink for RecordingEventSink {
    async fn publish(&self, event: &WorkflowEvent) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.events.lock().unwrap().push(event.clone());
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingAudit {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditLogger for RecordingAudit {
    fn log(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}
