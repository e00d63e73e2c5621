//! Planner error types.
//!
//! This file defines the typed errors surfaced by plan generation.
//! All errors are synchronous and abort the generation pass; there is
//! no partial or recoverable state, so a failed run can simply be
//! retried after fixing the input.

/// Errors that can occur while generating a fabric plan
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The input configuration is inconsistent and generation never started
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A topology invariant would be violated (more than 4 neighbor
    /// directions at a node, or an interface slot collision)
    #[error("Topology invariant violation: {0}")]
    InvariantViolation(String),

    /// The requested fabric size does not fit the IPv6 prefix layout
    #[error("Address space exhausted: {0}")]
    AddressSpaceExhaustion(String),
}
