//! Quorum consensus domain
//!
//! A round's reviews are reconciled into a single [`ConsensusVote`]. The vote
//! is only ever computed over a full quorum: one review from every
//! designated evaluator.
//!
//! # Redraft rule
//!
//! ```text
//! major_issue count   requires_redraft
//! ─────────────────   ────────────────
//!        0                 no
//!        1                 no   (recorded, non-blocking)
//!       ≥2                 yes
//! ```
//!
//! Minor issues never block on their own, whatever their count.

pub mod consensus;
pub mod vote;

pub use consensus::{ConsensusOutcome, ConsensusRound};
pub use vote::{Ballot, ConsensusVote, REDRAFT_MAJOR_THRESHOLD};
