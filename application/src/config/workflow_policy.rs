//! Workflow policy

use std::time::Duration;

/// Controls the redraft loop and the approval gate
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowPolicy {
    /// Default iteration budget when a request does not specify one
    pub max_iterations: u32,
    /// Escalate consensus-approved drafts to a human as well
    pub human_signoff: bool,
    /// Lifetime of an approval token
    pub approval_ttl: Duration,
    /// Prefix of approval URLs, without trailing slash
    pub approval_base_url: String,
    /// Period of the background expiry sweep
    pub sweep_interval: Duration,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            human_signoff: false,
            approval_ttl: Duration::from_secs(3600),
            approval_base_url: "http://127.0.0.1:8750".to_string(),
            sweep_interval: Duration::from_secs(30),
        }
    }
}

impl WorkflowPolicy {
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_human_signoff(mut self, enabled: bool) -> Self {
        self.human_signoff = enabled;
        self
    }

    pub fn with_approval_ttl(mut self, ttl: Duration) -> Self {
        self.approval_ttl = ttl;
        self
    }

    pub fn with_approval_base_url(mut self, url: impl Into<String>) -> Self {
        self.approval_base_url = url.into();
        self
    }

    /// `{base}/approval/{token}`
    pub fn approval_url(&self, token: &str) -> String {
        format!(
            "{}/approval/{}",
            self.approval_base_url.trim_end_matches('/'),
            token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_url_trims_trailing_slash() {
        let policy = WorkflowPolicy::default().with_approval_base_url("https://review.example/");
        assert_eq!(
            policy.approval_url("abc"),
            "https://review.example/approval/abc"
        );
    }
}
