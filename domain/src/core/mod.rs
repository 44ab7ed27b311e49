//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: workflow, draft and approval-token identifiers
//! - [`text`]: word-level helpers used by the review rules and scoring
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod ids;
pub mod text;
