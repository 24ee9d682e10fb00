//! pathsat-lra - Linear rational arithmetic engine
//!
//! A tableau-based two-phase simplex over the core scalar abstraction:
//!
//! - free variables are split into nonnegative pairs `x = x⁺ − x⁻`;
//! - each constraint row gets a slack variable (inequalities) and, when the
//!   starting basis is infeasible, an artificial variable whose sum Phase 1
//!   minimizes; a nonzero Phase-1 minimum means the system is infeasible;
//! - Phase 2 pivots under Bland's rule, which guarantees termination under
//!   degeneracy (the engine only needs a feasible vertex, not optimality);
//! - strict inequalities perturb the right-hand side by a symbolic
//!   infinitesimal δ whose coefficient is tracked separately from the
//!   rational magnitude, so `<` and `≤` share one tableau;
//! - rows can be added incrementally against a solved tableau (the new
//!   artificial is minimized alone), and whole-state checkpoints make
//!   backtracking exact.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod delta;
pub mod simplex;
pub mod vars;

pub use delta::Delta;
pub use simplex::{Checkpoint, LpModel, LpOutcome, LpStats, Simplex, SolveBudget};
pub use vars::{VarId, VarTable};
