//! pathsat-core - Common types for the pathsat constraint solver
//!
//! This crate provides the foundational types shared across the solver
//! components:
//! - Scalar abstraction (exact rational and tolerance-aware float backends)
//! - Typed constants and symbolic variables
//! - Term algebra (immutable expression trees with eager constant folding)
//! - Polynomials (linear normal form over exact rationals)
//! - Constraint model (single constraints, conjunctive systems, DNF)
//! - Normalization of boolean constraint expressions into linear systems
//! - Substitution table for linearized casts, modulo and integer division
//! - Solutions and solution validation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constant;
pub mod constraint;
pub mod error;
pub mod expr;
pub mod normalize;
pub mod poly;
pub mod scalar;
pub mod solution;
pub mod subst;
pub mod term;
pub mod validate;
pub mod variable;

pub use constant::{NumericConstant, PrimitiveType};
pub use constraint::{
    ComposedConstraint, ConstraintStack, ConstraintSystem, Relation, SingleConstraint,
};
pub use error::{
    IncompleteSolutionError, IncorrectUseError, LinearizeError, NormalizeError, TypeCheckError,
};
pub use expr::{CmpOp, ConstraintExpression, TypeConstraint};
pub use normalize::normalize;
pub use poly::Polynomial;
pub use scalar::{Approx, Scalar};
pub use solution::Solution;
pub use subst::SubstitutionTable;
pub use term::Term;
pub use validate::{composed_satisfied, constraint_status, ConstraintStatus};
pub use variable::{NumericKind, NumericVariable, VarOrigin};
