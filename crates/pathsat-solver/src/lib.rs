//! pathsat-solver - Incremental constraint solving for symbolic execution
//!
//! The public contract of the solver core: a stack-discipline API that
//! lets a bytecode interpreter push a constraint when entering a branch,
//! query satisfiability of the accumulated path condition, and pop on
//! backtracking while reusing solver state.
//!
//! ```
//! use pathsat_core::{ConstraintExpression, NumericVariable, PrimitiveType, Term};
//! use pathsat_solver::{IncrementalSolver, SolveOutcome};
//!
//! let x = Term::var(NumericVariable::new("x", PrimitiveType::Double));
//! let mut solver = IncrementalSolver::with_defaults();
//! solver
//!     .add_constraint(&ConstraintExpression::ge(x.clone(), Term::double(2.0)))
//!     .unwrap();
//! assert!(matches!(solver.solution(), SolveOutcome::Feasible(_)));
//! solver
//!     .add_constraint(&ConstraintExpression::lt(x, Term::double(2.0)))
//!     .unwrap();
//! assert!(matches!(solver.solution(), SolveOutcome::Infeasible));
//! solver.remove_constraint().unwrap();
//! assert!(matches!(solver.solution(), SolveOutcome::Feasible(_)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod outcome;
mod solver;

pub use config::{BranchPreference, NumericBackend, SolverConfig};
pub use error::SolverError;
pub use outcome::{Feasibility, SolveOutcome, UnknownReason};
pub use solver::IncrementalSolver;
