//! Review domain
//!
//! Verdicts produced by the three evaluators and the parsing of
//! service-backed assessment responses.

mod decision;
mod entities;
pub mod parsing;

pub use decision::{ReviewDecision, ReviewSource, ReviewerKind};
pub use entities::AgentReview;
pub use parsing::{ServiceAssessment, parse_assessment};
