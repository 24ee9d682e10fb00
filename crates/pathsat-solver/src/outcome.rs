//! Solver outcomes
//!
//! Algorithmic results are values, not exceptions: a query ends feasible
//! with a solution, infeasible, undecided, or timed out. Usage errors are
//! the separate [`SolverError`](crate::SolverError) type.

use pathsat_core::Solution;
use std::fmt;

/// Why a query ended without a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnknownReason {
    /// A proactive resource budget (pivots, nodes or cuts) ran out.
    Budget(&'static str),
    /// The float backend could not validate the solution within the
    /// rounding-error threshold.
    Numerics,
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownReason::Budget(what) => write!(f, "solver gave up: {}", what),
            UnknownReason::Numerics => write!(f, "numerical instability beyond threshold"),
        }
    }
}

/// Result of a `solution()` query.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveOutcome {
    /// The constraint stack is satisfiable; here is a witness.
    Feasible(Solution),
    /// No assignment satisfies the constraint stack.
    Infeasible,
    /// Undecided; callers should treat the branch as unknown and usually
    /// assume feasibility to avoid unsound pruning.
    Unknown(UnknownReason),
    /// The wall-clock budget was exceeded.
    TimedOut,
}

impl SolveOutcome {
    /// The witness, when feasible.
    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Feasible(s) => Some(s),
            _ => None,
        }
    }

    /// Collapse to the feasibility-only view.
    #[must_use]
    pub fn feasibility(&self) -> Feasibility {
        match self {
            SolveOutcome::Feasible(_) => Feasibility::Feasible,
            SolveOutcome::Infeasible => Feasibility::Infeasible,
            SolveOutcome::Unknown(r) => Feasibility::Unknown(*r),
            SolveOutcome::TimedOut => Feasibility::TimedOut,
        }
    }
}

/// Result of an `is_satisfiable()` query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feasibility {
    /// Satisfiable.
    Feasible,
    /// Unsatisfiable.
    Infeasible,
    /// Undecided.
    Unknown(UnknownReason),
    /// Wall-clock budget exceeded.
    TimedOut,
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveOutcome::Feasible(s) => write!(f, "feasible: {}", s),
            SolveOutcome::Infeasible => write!(f, "infeasible"),
            SolveOutcome::Unknown(r) => write!(f, "unknown ({})", r),
            SolveOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}
