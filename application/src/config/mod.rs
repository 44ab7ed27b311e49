//! Application-level configuration.
//!
//! Configuration types that control how use cases behave:
//!
//! - [`WorkflowPolicy`]: iteration budget, human sign-off, approval expiry
//! - [`ResilienceSettings`]: breaker thresholds and per-mode retry policies
//! - [`ReviewGuidelines`]: brand, SEO and compliance rules for the evaluators

pub mod guidelines;
pub mod resilience;
pub mod workflow_policy;

pub use guidelines::{BrandGuidelines, ComplianceGuidelines, ReviewGuidelines, SeoGuidelines};
pub use resilience::ResilienceSettings;
pub use workflow_policy::WorkflowPolicy;
