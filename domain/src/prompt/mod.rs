//! Prompt domain
//!
//! Templates for service-backed assessments and for draft generation.

mod template;

pub use template::{AssessmentPromptTemplate, DraftPromptTemplate};
