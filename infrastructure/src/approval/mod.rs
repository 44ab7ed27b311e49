//! Human approval channel adapters

mod http;
mod notifier;

pub use http::{ApprovalSummary, DecisionForm, DecisionResponse, approval_router, serve};
pub use notifier::LoggingApprovalNotifier;
