//! Error types for constraint construction and normalization

use thiserror::Error;

/// Malformed constraint input: operand types are incompatible.
///
/// Raised by type checking of terms and comparisons. Always surfaced to the
/// caller immediately, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeCheckError {
    /// An arithmetic operator was applied to a boolean operand.
    #[error("boolean operand in arithmetic context: {0}")]
    BooleanOperand(String),

    /// A bitwise or modulo operator was applied to a non-integer operand.
    #[error("{op} requires integer operands, got {found}")]
    IntegerOperatorMisuse {
        /// The offending operator.
        op: &'static str,
        /// The non-integer type that was found.
        found: String,
    },

    /// A comparison mixed arithmetic and non-arithmetic operands.
    #[error("comparison over non-numeric operand: {0}")]
    NonNumericComparison(String),

    /// A reference-type membership constraint reached the arithmetic core.
    #[error("type-membership constraint is not an arithmetic constraint: {0}")]
    NonArithmeticConstraint(String),
}

/// A term could not be brought into linear polynomial form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinearizeError {
    /// Product or quotient of two non-constant subterms.
    #[error("non-linear term: {0}")]
    NonLinear(String),

    /// An operator that is excluded from direct solving reached the
    /// linearizer without being eliminated first.
    #[error("operator {0} cannot be linearized directly")]
    UnsupportedOperator(&'static str),

    /// Division by a constant zero.
    #[error("division by constant zero in {0}")]
    DivisionByZero(String),

    /// A folded constant has no finite rational value.
    #[error("non-finite constant {0} in linear context")]
    NonFiniteConstant(String),
}

/// Normalization of a constraint expression failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Operand types do not fit the expression.
    #[error(transparent)]
    TypeCheck(#[from] TypeCheckError),

    /// Linearization failed on a subterm.
    #[error(transparent)]
    Linearize(#[from] LinearizeError),

    /// A construct the solver does not handle yet.
    #[error("not yet supported: {0}")]
    Unsupported(String),

    /// The disjunctive normal form grew past the internal system cap.
    #[error("disjunctive normal form exceeds {0} systems")]
    DnfOverflow(usize),
}

/// Programmer/usage error on the solver API, e.g. popping an empty stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incorrect solver use: {0}")]
pub struct IncorrectUseError(pub &'static str);

/// A solution was validated against constraints that reference variables
/// absent from it. This is a data-consistency error between caller and
/// solver, not a solver-internal fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("solution has no binding for variable {variable}")]
pub struct IncompleteSolutionError {
    /// Name of the unbound variable.
    pub variable: String,
}
