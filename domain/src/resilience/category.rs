//! Error classification for outbound calls

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of failure categories for outbound calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Timeout,
    RateLimit,
    ServerError,
    Authentication,
    Validation,
    Fatal,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::Network,
        ErrorCategory::Timeout,
        ErrorCategory::RateLimit,
        ErrorCategory::ServerError,
        ErrorCategory::Authentication,
        ErrorCategory::Validation,
        ErrorCategory::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::RateLimit => "rate_limit",
            ErrorCategory::ServerError => "server_error",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Fatal => "fatal",
        }
    }

    /// Retry is never attempted for these, whatever the policy says
    pub fn is_never_retried(&self) -> bool {
        matches!(self, ErrorCategory::Authentication | ErrorCategory::Fatal)
    }

    /// Upper bound on retries for this category regardless of policy
    pub fn retry_cap(&self) -> Option<u32> {
        match self {
            ErrorCategory::Validation => Some(1),
            ErrorCategory::Authentication | ErrorCategory::Fatal => Some(0),
            _ => None,
        }
    }

    /// Multiplier applied on top of exponential backoff
    pub fn backoff_multiplier(&self) -> u32 {
        match self {
            ErrorCategory::RateLimit => 2,
            _ => 1,
        }
    }

    /// A malformed response says nothing about the target's health
    pub fn counts_toward_breaker(&self) -> bool {
        !matches!(self, ErrorCategory::Validation)
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified failure of one outbound call
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{target}: {category} error: {message}")]
pub struct CallError {
    pub category: ErrorCategory,
    pub message: String,
    /// Downstream endpoint or provider the call was made against
    pub target: String,
}

impl CallError {
    pub fn new(
        target: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            target: target.into(),
        }
    }

    pub fn network(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(target, ErrorCategory::Network, message)
    }

    pub fn timeout(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(target, ErrorCategory::Timeout, message)
    }

    pub fn validation(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(target, ErrorCategory::Validation, message)
    }

    pub fn fatal(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(target, ErrorCategory::Fatal, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_rules_per_category() {
        assert!(ErrorCategory::Authentication.is_never_retried());
        assert!(ErrorCategory::Fatal.is_never_retried());
        assert!(!ErrorCategory::Network.is_never_retried());
        assert_eq!(ErrorCategory::Validation.retry_cap(), Some(1));
        assert_eq!(ErrorCategory::ServerError.retry_cap(), None);
        assert_eq!(ErrorCategory::RateLimit.backoff_multiplier(), 2);
        assert_eq!(ErrorCategory::Timeout.backoff_multiplier(), 1);
    }

    #[test]
    fn test_only_validation_skips_breaker() {
        for category in ErrorCategory::ALL {
            assert_eq!(
                category.counts_toward_breaker(),
                category != ErrorCategory::Validation
            );
        }
    }

    #[test]
    fn test_call_error_display() {
        let err = CallError::new("openai", ErrorCategory::RateLimit, "429 Too Many Requests");
        assert_eq!(err.to_string(), "openai: rate_limit error: 429 Too Many Requests");
    }
}
