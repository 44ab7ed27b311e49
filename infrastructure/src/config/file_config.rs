//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use application types where the
//! shape matches (the review guidelines).

use review_application::{
    BrandGuidelines, ComplianceGuidelines, ResilienceSettings, ReviewGuidelines, SeoGuidelines,
    WorkflowPolicy,
};
use review_domain::{BreakerConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigValidationError {
    #[error("workflow.max_iterations must be at least 1")]
    ZeroIterations,

    #[error("{section}.max_attempts must be at least 1")]
    ZeroAttempts { section: &'static str },

    #[error("workflow.approval_ttl_secs cannot be 0")]
    ZeroApprovalTtl,

    #[error("resilience.breaker.failure_threshold must be at least 1")]
    ZeroFailureThreshold,

    #[error("provider #{index}: name cannot be empty")]
    EmptyProviderName { index: usize },

    #[error("provider '{name}': model cannot be empty")]
    EmptyModelName { name: String },

    #[error("duplicate provider name '{0}'")]
    DuplicateProvider(String),
}

/// Raw workflow configuration (`[workflow]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    pub max_iterations: u32,
    /// Escalate consensus-approved drafts to a human too
    pub human_signoff: bool,
    pub approval_ttl_secs: u64,
    pub approval_base_url: String,
    pub sweep_interval_secs: u64,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        let policy = WorkflowPolicy::default();
        Self {
            max_iterations: policy.max_iterations,
            human_signoff: policy.human_signoff,
            approval_ttl_secs: policy.approval_ttl.as_secs(),
            approval_base_url: policy.approval_base_url,
            sweep_interval_secs: policy.sweep_interval.as_secs(),
        }
    }
}

impl FileWorkflowConfig {
    pub fn to_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            max_iterations: self.max_iterations,
            human_signoff: self.human_signoff,
            approval_ttl: Duration::from_secs(self.approval_ttl_secs),
            approval_base_url: self.approval_base_url.clone(),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
        }
    }
}

/// Raw breaker configuration (`[resilience.breaker]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBreakerConfig {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

impl Default for FileBreakerConfig {
    fn default() -> Self {
        let config = BreakerConfig::default();
        Self {
            failure_threshold: config.failure_threshold,
            cooldown_secs: config.cooldown.as_secs(),
        }
    }
}

/// Raw retry budget for one invocation mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub attempt_timeout_secs: u64,
}

impl From<&RetryPolicy> for FileRetryConfig {
    fn from(policy: &RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            attempt_timeout_secs: policy.attempt_timeout.as_secs(),
        }
    }
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self::from(&RetryPolicy::fallback_routing())
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_attempt_timeout(Duration::from_secs(self.attempt_timeout_secs))
    }
}

/// Raw resilience configuration (`[resilience]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResilienceConfig {
    pub breaker: FileBreakerConfig,
    pub fallback: FileRetryConfig,
    pub round_table: FileRetryConfig,
}

impl Default for FileResilienceConfig {
    fn default() -> Self {
        Self {
            breaker: FileBreakerConfig::default(),
            fallback: FileRetryConfig::from(&RetryPolicy::fallback_routing()),
            round_table: FileRetryConfig::from(&RetryPolicy::round_table()),
        }
    }
}

impl FileResilienceConfig {
    pub fn to_settings(&self) -> ResilienceSettings {
        ResilienceSettings {
            breaker: BreakerConfig {
                failure_threshold: self.breaker.failure_threshold,
                cooldown: Duration::from_secs(self.breaker.cooldown_secs),
            },
            fallback: self.fallback.to_policy(),
            round_table: self.round_table.to_policy(),
        }
    }
}

/// Wire protocol spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions
    #[default]
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// One `[[providers]]` entry. Order is fallback-routing order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub model: String,
    /// Defaults per `kind`
    pub base_url: Option<String>,
    /// Environment variable holding the API key; defaults per `kind`
    pub api_key_env: Option<String>,
    pub max_tokens: Option<u32>,
}

impl FileProviderConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.kind.default_api_key_env())
    }
}

/// Raw approval server configuration (`[approval_server]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApprovalServerConfig {
    pub bind: String,
}

impl Default for FileApprovalServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8750".to_string(),
        }
    }
}

/// Raw terminal-event configuration (`[events]`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEventsConfig {
    pub webhook_url: Option<String>,
}

/// Raw logging configuration (`[logging]`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the daily-rolling JSON diagnostic log
    pub dir: Option<PathBuf>,
    /// JSONL audit trail path
    pub audit_log: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub workflow: FileWorkflowConfig,
    pub resilience: FileResilienceConfig,
    pub providers: Vec<FileProviderConfig>,
    pub brand: BrandGuidelines,
    pub seo: SeoGuidelines,
    pub compliance: ComplianceGuidelines,
    pub approval_server: FileApprovalServerConfig,
    pub events: FileEventsConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    pub fn guidelines(&self) -> ReviewGuidelines {
        ReviewGuidelines {
            brand: self.brand.clone(),
            seo: self.seo.clone(),
            compliance: self.compliance.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.workflow.max_iterations == 0 {
            return Err(ConfigValidationError::ZeroIterations);
        }
        if self.workflow.approval_ttl_secs == 0 {
            return Err(ConfigValidationError::ZeroApprovalTtl);
        }
        if self.resilience.breaker.failure_threshold == 0 {
            return Err(ConfigValidationError::ZeroFailureThreshold);
        }
        for (section, retry) in [
            ("resilience.fallback", &self.resilience.fallback),
            ("resilience.round_table", &self.resilience.round_table),
        ] {
            if retry.max_attempts == 0 {
                return Err(ConfigValidationError::ZeroAttempts { section });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for (index, provider) in self.providers.iter().enumerate() {
            if provider.name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyProviderName { index });
            }
            if provider.model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName {
                    name: provider.name.clone(),
                });
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigValidationError::DuplicateProvider(provider.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[workflow]
max_iterations = 3
human_signoff = true

[resilience.breaker]
failure_threshold = 4

[[providers]]
name = "primary"
kind = "anthropic"
model = "claude-sonnet"

[[providers]]
name = "backup"
model = "gpt-4o-mini"
base_url = "http://localhost:11434/v1"

[brand]
brand_keywords = ["Maison"]

[compliance]
regulated_categories = ["health"]

[events]
webhook_url = "https://hooks.example/review"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workflow.max_iterations, 3);
        assert!(config.workflow.to_policy().human_signoff);
        assert_eq!(config.resilience.to_settings().breaker.failure_threshold, 4);
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].kind, ProviderKind::Anthropic);
        assert_eq!(config.providers[0].api_key_env(), "ANTHROPIC_API_KEY");
        assert_eq!(config.providers[1].base_url(), "http://localhost:11434/v1");
        assert_eq!(config.brand.brand_keywords, vec!["Maison".to_string()]);
        // Unset guideline fields keep their defaults
        assert_eq!(config.brand.min_word_count, 600);
        assert_eq!(config.compliance.regulated_categories, vec!["health".to_string()]);
        assert!(!config.compliance.disclaimer_markers.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        let policy = config.workflow.to_policy();
        assert_eq!(policy.max_iterations, 2);
        assert_eq!(policy.approval_ttl, Duration::from_secs(3600));

        let settings = config.resilience.to_settings();
        assert_eq!(settings.fallback.max_attempts, 2);
        assert_eq!(settings.round_table.max_attempts, 3);
        assert_eq!(settings.breaker.cooldown, Duration::from_secs(60));
        assert_eq!(config.approval_server.bind, "127.0.0.1:8750");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_iterations() {
        let config: FileConfig = toml::from_str("[workflow]\nmax_iterations = 0").unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroIterations));
    }

    #[test]
    fn test_validate_zero_attempts() {
        let config: FileConfig =
            toml::from_str("[resilience.round_table]\nmax_attempts = 0").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroAttempts {
                section: "resilience.round_table"
            })
        );
    }

    #[test]
    fn test_validate_provider_entries() {
        let config: FileConfig =
            toml::from_str("[[providers]]\nname = \"a\"\nmodel = \"\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyModelName { .. })
        ));

        let config: FileConfig = toml::from_str(
            "[[providers]]\nname = \"a\"\nmodel = \"m\"\n[[providers]]\nname = \"a\"\nmodel = \"n\"",
        )
        .unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::DuplicateProvider("a".into()))
        );
    }
}
