//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! implement. Every optional port ships a no-op implementation.

pub mod approval_notifier;
pub mod audit_logger;
pub mod clock;
pub mod completion_provider;
pub mod draft_generator;
pub mod event_sink;
pub mod progress;
