//! Webhook delivery of terminal workflow events
//!
//! Events are POSTed as JSON through the resilience executor under the
//! breaker target `webhook`. Delivery is at-least-once: a receiver that
//! answers slowly may see the same event twice. A delivery that still fails
//! after its retries is logged and dropped.

use crate::providers::http_error::{read_success, transport_error};
use async_trait::async_trait;
use reqwest::Client;
use review_application::{ResilienceExecutor, WorkflowEventSink};
use review_domain::{RetryPolicy, WorkflowEvent};
use std::time::Duration;
use tracing::{debug, warn};

pub const WEBHOOK_TARGET: &str = "webhook";

pub struct WebhookEventSink {
    client: Client,
    url: String,
    executor: ResilienceExecutor,
    policy: RetryPolicy,
}

impl WebhookEventSink {
    pub fn new(url: impl Into<String>, executor: ResilienceExecutor) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            executor,
            policy: RetryPolicy::new(3)
                .with_base_delay(Duration::from_millis(500))
                .with_max_delay(Duration::from_secs(5))
                .with_attempt_timeout(Duration::from_secs(10)),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn deliver(&self, event: &WorkflowEvent) -> Result<(), review_application::ResilienceError> {
        self.executor
            .execute(WEBHOOK_TARGET, &self.policy, || async move {
                let response = self
                    .client
                    .post(&self.url)
                    .json(event)
                    .send()
                    .await
                    .map_err(|e| transport_error(WEBHOOK_TARGET, &e))?;
                read_success(WEBHOOK_TARGET, response).await.map(|_| ())
            })
            .await
    }
}

#[async_trait]
impl WorkflowEventSink for WebhookEventSink {
    async fn publish(&self, event: &WorkflowEvent) {
        match self.deliver(event).await {
            Ok(()) => debug!(workflow_id = %event.workflow_id, "Webhook delivered"),
            Err(e) => warn!(
                workflow_id = %event.workflow_id,
                status = %event.status,
                "Webhook delivery failed: {}",
                e
            ),
        }
    }
}
