//! Workflow domain
//!
//! [`WorkflowState`] is the aggregate root of a review workflow. Every status
//! change goes through a method that checks the transition against the state
//! machine:
//!
//! ```text
//! drafting ──▶ reviewing ──┬──▶ approved
//!    ▲                     ├──▶ redraft_required ──▶ drafting (next iteration)
//!    │                     └──▶ awaiting_human_approval ──┬──▶ approved
//!    │                                                    ├──▶ rejected
//!    └── (redraft_required)                               └──▶ expired
//! ```

mod event;
mod record;
mod state;
mod status;

pub use event::WorkflowEvent;
pub use record::{HumanDecision, ReviewRecord};
pub use state::WorkflowState;
pub use status::WorkflowStatus;
