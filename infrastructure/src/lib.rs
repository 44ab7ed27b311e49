//! Infrastructure layer for content-quorum
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: HTTP completion providers, the provider-backed draft
//! generator, terminal event sinks, the approval HTTP channel, the JSONL
//! audit trail and configuration file loading.

pub mod approval;
pub mod config;
pub mod draft;
pub mod events;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use approval::{LoggingApprovalNotifier, approval_router, serve as serve_approvals};
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, FileProviderConfig, ProviderKind};
pub use draft::LlmDraftGenerator;
pub use events::{LoggingEventSink, WebhookEventSink};
pub use logging::JsonlAuditLogger;
pub use providers::{AnthropicProvider, OpenAiCompatibleProvider, build_providers};
