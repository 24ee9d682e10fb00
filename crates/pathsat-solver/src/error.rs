//! Facade error taxonomy
//!
//! Errors are conditions the caller must fix (malformed constraints,
//! misuse of the stack discipline, inconsistent validation data), never
//! algorithmic outcomes: infeasibility, timeouts and gave-up searches are
//! [`SolveOutcome`](crate::SolveOutcome) values.

use pathsat_core::{IncompleteSolutionError, IncorrectUseError, NormalizeError};
use thiserror::Error;

/// Errors surfaced by the incremental solver facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The pushed constraint is malformed or unsupported (includes type
    /// check failures).
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Stack-discipline misuse, e.g. removing from an empty stack. A
    /// programming defect, not a data condition.
    #[error(transparent)]
    IncorrectUse(#[from] IncorrectUseError),

    /// A solution was validated against constraints with unbound
    /// variables.
    #[error(transparent)]
    IncompleteSolution(#[from] IncompleteSolutionError),
}
