//! Provider invocation layer
//!
//! Routes completion requests to interchangeable external providers, each
//! call wrapped by the [`ResilienceExecutor`](crate::resilience::ResilienceExecutor).
//!
//! | Mode | Providers called | Per-provider budget | Result |
//! |------|------------------|---------------------|--------|
//! | Fallback routing | in order, until one succeeds | tight (2 attempts) | first success or last failure |
//! | Round table | all, concurrently | generous (3 attempts) | every success; fails only if all fail |

pub mod invoker;
pub mod scoring;

pub use invoker::{
    InvocationError, ProviderFailure, ProviderInvoker, ProviderResult, RoundTableOutcome,
};
pub use scoring::{RankedResponse, ResponseScorer, ResponseScores};
