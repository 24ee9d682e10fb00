//! Solution validation
//!
//! Evaluates constraints at a candidate solution with a rounding-error
//! tolerance. The float backend's post-solving pass and the test suites use
//! this as the soundness oracle.

use crate::constraint::{ComposedConstraint, Relation, SingleConstraint};
use crate::error::IncompleteSolutionError;
use crate::variable::NumericVariable;
use num_rational::BigRational;
use num_traits::Zero;
use std::collections::BTreeMap;

/// How a constraint fares at a candidate point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintStatus {
    /// Satisfied exactly.
    Holds,
    /// Violated by no more than the tolerance; acceptable up to rounding.
    RoundingError(BigRational),
    /// Violated beyond the tolerance.
    Fails(BigRational),
}

impl ConstraintStatus {
    /// Whether the constraint is accepted at this tolerance.
    #[must_use]
    pub fn accepted(&self) -> bool {
        !matches!(self, ConstraintStatus::Fails(_))
    }
}

/// Evaluate one constraint at rational bindings.
pub fn constraint_status(
    constraint: &SingleConstraint,
    bindings: &BTreeMap<NumericVariable, BigRational>,
    tolerance: &BigRational,
) -> Result<ConstraintStatus, IncompleteSolutionError> {
    let value = constraint.polynomial().eval(bindings)?;
    let zero = BigRational::zero();
    let holds = match constraint.relation() {
        Relation::Eq => value.is_zero(),
        Relation::Le => value <= zero,
        Relation::Lt => value < zero,
    };
    if holds {
        return Ok(ConstraintStatus::Holds);
    }
    let violation = match constraint.relation() {
        Relation::Eq => {
            if value < zero {
                -value
            } else {
                value
            }
        }
        Relation::Le | Relation::Lt => value,
    };
    if violation <= *tolerance {
        Ok(ConstraintStatus::RoundingError(violation))
    } else {
        Ok(ConstraintStatus::Fails(violation))
    }
}

/// Whether some system of a composed constraint is accepted at the
/// bindings. Systems referencing unbound variables count as not satisfied.
#[must_use]
pub fn composed_satisfied(
    composed: &ComposedConstraint,
    bindings: &BTreeMap<NumericVariable, BigRational>,
    tolerance: &BigRational,
) -> bool {
    composed.systems().iter().any(|system| {
        system.constraints().iter().all(|c| {
            matches!(
                constraint_status(c, bindings, tolerance),
                Ok(status) if status.accepted()
            )
        })
    })
}
