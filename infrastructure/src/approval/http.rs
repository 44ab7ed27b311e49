//! Approval HTTP surface
//!
//! `GET /approval/:token` returns a summary of the escalated workflow;
//! `POST /approval/:token/decision` is the only mutating call. Gateway
//! results map onto status codes:
//!
//! | result                      | status |
//! |-----------------------------|--------|
//! | decision applied            | 200    |
//! | unknown token               | 401    |
//! | token already used          | 409    |
//! | token expired               | 410    |
//! | workflow no longer stored   | 404    |

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use review_application::{ApprovalError, HumanApprovalGateway, TokenInvalidReason};
use review_domain::{
    AgentReview, ContentDraft, HumanDecision, WorkflowId, WorkflowState, WorkflowStatus,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type GatewayState = Arc<HumanApprovalGateway>;

/// What the approver sees before deciding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalSummary {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub topic: String,
    pub iteration_count: u32,
    pub max_iterations: u32,
    pub current_draft: Option<ContentDraft>,
    pub latest_reviews: Vec<AgentReview>,
    pub pending_feedback: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApprovalSummary {
    fn from_state(state: &WorkflowState) -> Self {
        Self {
            workflow_id: state.workflow_id().clone(),
            status: state.status(),
            topic: state.request().topic.clone(),
            iteration_count: state.iteration_count(),
            max_iterations: state.max_iterations(),
            current_draft: state.current_draft().cloned(),
            latest_reviews: state.latest_reviews().into_iter().cloned().collect(),
            pending_feedback: state.pending_feedback().map(str::to_string),
            expires_at: state.token_expires_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionForm {
    pub decision: HumanDecision,
    #[serde(default)]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub decision: HumanDecision,
}

pub fn approval_router(gateway: GatewayState) -> Router {
    Router::new()
        .route("/approval/:token", get(show_approval))
        .route("/approval/:token/decision", post(submit_decision))
        .with_state(gateway)
}

/// Serve the approval routes until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    gateway: GatewayState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Approval server listening");
    axum::serve(listener, approval_router(gateway))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn show_approval(
    State(gateway): State<GatewayState>,
    Path(token): Path<String>,
) -> Result<Json<ApprovalSummary>, (StatusCode, String)> {
    let state = gateway.inspect(&token).await.map_err(rejection)?;
    Ok(Json(ApprovalSummary::from_state(&state)))
}

async fn submit_decision(
    State(gateway): State<GatewayState>,
    Path(token): Path<String>,
    Json(form): Json<DecisionForm>,
) -> Result<Json<DecisionResponse>, (StatusCode, String)> {
    let state = gateway
        .submit_decision(&token, form.decision, form.rationale)
        .await
        .map_err(rejection)?;
    Ok(Json(DecisionResponse {
        workflow_id: state.workflow_id().clone(),
        status: state.status(),
        decision: form.decision,
    }))
}

fn status_for(err: &ApprovalError) -> StatusCode {
    match err {
        ApprovalError::TokenInvalid {
            reason: TokenInvalidReason::Unknown,
        } => StatusCode::UNAUTHORIZED,
        ApprovalError::TokenInvalid {
            reason: TokenInvalidReason::AlreadyConsumed,
        } => StatusCode::CONFLICT,
        ApprovalError::TokenExpired => StatusCode::GONE,
        ApprovalError::UnknownWorkflow(_) => StatusCode::NOT_FOUND,
        ApprovalError::Domain(_) => StatusCode::CONFLICT,
    }
}

fn rejection(err: ApprovalError) -> (StatusCode, String) {
    let status = status_for(&err);
    warn!(status = status.as_u16(), "Approval request rejected: {}", err);
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use review_application::{
        Clock, DraftGenerationError, DraftGenerator, ReviewGuidelines, RunReviewWorkflowUseCase,
        StartWorkflowInput, WorkflowPolicy, WorkflowStore, review_panel,
    };
    use review_domain::{DraftContent, DraftRequest};
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct TestClock(Mutex<DateTime<Utc>>);

    impl TestClock {
        fn advance(&self, by: chrono::Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    struct FixedGenerator;

    #[async_trait]
    impl DraftGenerator for FixedGenerator {
        async fn generate(
            &self,
            _request: &DraftRequest,
        ) -> Result<DraftContent, DraftGenerationError> {
            Ok(DraftContent::new("Caring for silk", "Wash silk gently. Learn more today."))
        }

        async fn redraft(
            &self,
            request: &DraftRequest,
            _previous: &ContentDraft,
            _feedback: &str,
        ) -> Result<DraftContent, DraftGenerationError> {
            self.generate(request).await
        }
    }

    /// A workflow escalated through human sign-off, plus its token
    async fn escalated() -> (Router, Arc<TestClock>, Arc<HumanApprovalGateway>, String) {
        let clock = Arc::new(TestClock(Mutex::new(Utc::now())));
        let policy = WorkflowPolicy::default()
            .with_human_signoff(true)
            .with_max_iterations(1);
        let gateway = Arc::new(HumanApprovalGateway::new(
            Arc::new(WorkflowStore::new()),
            policy,
            clock.clone(),
        ));
        let panel = review_panel(&ReviewGuidelines::default(), None, clock.clone());
        let use_case = RunReviewWorkflowUseCase::new(Arc::new(FixedGenerator), panel, gateway.clone());

        let request = DraftRequest::new("Silk care", vec!["silk".into()]).unwrap();
        let id = use_case
            .start_workflow(StartWorkflowInput::new(request))
            .await
            .unwrap();
        let state = use_case.get_workflow_state(&id).await.unwrap();
        assert_eq!(state.status(), WorkflowStatus::AwaitingHumanApproval);
        let token = state.approval_token().unwrap().as_str().to_string();

        (approval_router(gateway.clone()), clock, gateway, token)
    }

    fn decision(token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/approval/{}/decision", token))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn summary(token: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/approval/{}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_summary_shows_workflow() {
        let (router, _, _, token) = escalated().await;

        let response = router.oneshot(summary(&token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let summary: ApprovalSummary = serde_json::from_slice(&body).unwrap();
        assert_eq!(summary.status, WorkflowStatus::AwaitingHumanApproval);
        assert_eq!(summary.topic, "Silk care");
        assert_eq!(summary.latest_reviews.len(), 3);
        assert!(summary.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_approve_then_reuse_conflicts() {
        let (router, _, gateway, token) = escalated().await;

        let response = router
            .clone()
            .oneshot(decision(&token, r#"{"decision": "approve", "rationale": "fine"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let applied: DecisionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(applied.status, WorkflowStatus::Approved);

        let state = gateway.store().get(&applied.workflow_id).await.unwrap();
        assert_eq!(state.status(), WorkflowStatus::Approved);

        let again = router
            .oneshot(decision(&token, r#"{"decision": "reject"}"#))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let (router, _, _, _) = escalated().await;

        let response = router
            .clone()
            .oneshot(decision("not-a-token", r#"{"decision": "approve"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router.oneshot(summary("not-a-token")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_gone() {
        let (router, clock, _, token) = escalated().await;
        clock.advance(chrono::Duration::hours(2));

        let response = router
            .clone()
            .oneshot(decision(&token, r#"{"decision": "approve"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GONE);

        let response = router.oneshot(summary(&token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn test_malformed_decision_is_rejected_without_consuming() {
        let (router, _, _, token) = escalated().await;

        let response = router
            .clone()
            .oneshot(decision(&token, r#"{"decision": "maybe"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = router
            .oneshot(decision(&token, r#"{"decision": "reject"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
