//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod approval_gateway;
pub mod run_review_workflow;
pub(crate) mod shared;
pub mod workflow_store;
