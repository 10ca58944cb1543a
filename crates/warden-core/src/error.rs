// error.rs — Error types for the governance core.
//
// Policy outcomes (deny, escalate, unaffordable) are values, not errors.
// The only failures here are malformed budget parameters and a broken
// enforcement invariant.

use thiserror::Error;

use crate::budget::EnforcementLevel;

/// Errors that can occur while constructing or checking governance state.
#[derive(Debug, Error, PartialEq)]
pub enum GovernanceError {
    /// Budget parameters are outside their valid ranges
    /// (zero ceiling, thresholds outside (0, 1), warning above critical).
    #[error("invalid budget: {reason}")]
    InvalidBudget { reason: String },

    /// A budget carries an enforcement level weaker than its spend warrants.
    ///
    /// Reconciliation makes this unreachable; seeing it means the monotonic
    /// guarantee has been broken and the engine must stop.
    #[error(
        "enforcement invariant violated: level {actual} is weaker than calculated {calculated}"
    )]
    InvariantViolation {
        actual: EnforcementLevel,
        calculated: EnforcementLevel,
    },
}
