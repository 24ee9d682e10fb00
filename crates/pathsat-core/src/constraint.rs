//! Linear constraints, conjunctive systems and their disjunctions
//!
//! A [`SingleConstraint`] is one linear (in)equation `p ⋈ 0` with
//! `⋈ ∈ {=, ≤, <}`; `≥` and `>` are normalized away by sign flip.
//! Strictness is the relation tag, never an encoded number.
//!
//! A [`ComposedConstraint`] is a disjunction of conjunctive
//! [`ConstraintSystem`]s, i.e. disjunctive normal form. The solver façade
//! stacks composed constraints in a [`ConstraintStack`] whose removal is
//! always "pop the most recently added".

use crate::error::IncorrectUseError;
use crate::poly::Polynomial;
use num_traits::Zero;
use std::fmt;

/// Relation of a polynomial against zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `p == 0`
    Eq,
    /// `p <= 0`
    Le,
    /// `p < 0` (strict)
    Lt,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relation::Eq => "==",
            Relation::Le => "<=",
            Relation::Lt => "<",
        };
        write!(f, "{}", s)
    }
}

/// One linear (in)equation `polynomial ⋈ 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleConstraint {
    poly: Polynomial,
    relation: Relation,
}

impl SingleConstraint {
    /// Build `poly ⋈ 0`.
    #[must_use]
    pub fn new(poly: Polynomial, relation: Relation) -> Self {
        SingleConstraint { poly, relation }
    }

    /// A constraint that no assignment satisfies (`1 == 0`).
    #[must_use]
    pub fn contradiction() -> Self {
        SingleConstraint {
            poly: Polynomial::constant(num_rational::BigRational::from_integer(1.into())),
            relation: Relation::Eq,
        }
    }

    /// The linear form.
    #[must_use]
    pub fn polynomial(&self) -> &Polynomial {
        &self.poly
    }

    /// The relation against zero.
    #[must_use]
    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// For a variable-free constraint, whether it holds.
    /// `None` when variables occur.
    #[must_use]
    pub fn constant_truth(&self) -> Option<bool> {
        let c = self.poly.as_constant()?;
        Some(match self.relation {
            Relation::Eq => c.is_zero(),
            Relation::Le => *c <= num_rational::BigRational::zero(),
            Relation::Lt => *c < num_rational::BigRational::zero(),
        })
    }
}

impl fmt::Display for SingleConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0", self.poly, self.relation)
    }
}

/// A conjunction of single constraints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintSystem {
    constraints: Vec<SingleConstraint>,
}

impl ConstraintSystem {
    /// The empty (trivially true) system.
    #[must_use]
    pub fn new() -> Self {
        ConstraintSystem::default()
    }

    /// Conjoin one constraint. Variable-free constraints are decided on the
    /// spot: true ones are dropped, false ones collapse the system into a
    /// contradiction.
    pub fn push(&mut self, c: SingleConstraint) {
        match c.constant_truth() {
            Some(true) => {}
            Some(false) => {
                self.constraints.clear();
                self.constraints.push(SingleConstraint::contradiction());
            }
            None => self.constraints.push(c),
        }
    }

    /// The conjoined constraints in insertion order.
    #[must_use]
    pub fn constraints(&self) -> &[SingleConstraint] {
        &self.constraints
    }

    /// Whether the system is the empty conjunction.
    #[must_use]
    pub fn is_trivially_true(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether the system already collapsed to a contradiction.
    #[must_use]
    pub fn is_trivially_false(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| c.constant_truth() == Some(false))
    }

    /// Conjunction of two systems.
    #[must_use]
    pub fn merged(&self, other: &ConstraintSystem) -> ConstraintSystem {
        let mut out = self.clone();
        for c in &other.constraints {
            out.push(c.clone());
        }
        out
    }
}

impl From<SingleConstraint> for ConstraintSystem {
    fn from(c: SingleConstraint) -> Self {
        let mut s = ConstraintSystem::new();
        s.push(c);
        s
    }
}

impl fmt::Display for ConstraintSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return write!(f, "true");
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// A disjunction of conjunctive systems (disjunctive normal form).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposedConstraint {
    systems: Vec<ConstraintSystem>,
}

impl ComposedConstraint {
    /// The trivially true constraint (one empty system).
    #[must_use]
    pub fn trivially_true() -> Self {
        ComposedConstraint {
            systems: vec![ConstraintSystem::new()],
        }
    }

    /// The unsatisfiable constraint (no systems).
    #[must_use]
    pub fn unsatisfiable() -> Self {
        ComposedConstraint { systems: Vec::new() }
    }

    /// Build from systems, dropping contradictory ones.
    #[must_use]
    pub fn from_systems(systems: Vec<ConstraintSystem>) -> Self {
        ComposedConstraint {
            systems: systems
                .into_iter()
                .filter(|s| !s.is_trivially_false())
                .collect(),
        }
    }

    /// The alternative systems.
    #[must_use]
    pub fn systems(&self) -> &[ConstraintSystem] {
        &self.systems
    }

    /// Whether no system remains.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        self.systems.is_empty()
    }

    /// Whether some system is the empty conjunction.
    #[must_use]
    pub fn is_trivially_true(&self) -> bool {
        self.systems.iter().any(ConstraintSystem::is_trivially_true)
    }

    /// Disjunction: concatenate alternatives.
    #[must_use]
    pub fn or(&self, other: &ComposedConstraint) -> ComposedConstraint {
        let mut systems = self.systems.clone();
        systems.extend(other.systems.iter().cloned());
        ComposedConstraint::from_systems(systems)
    }

    /// Conjunction: distribute over the disjunctions. `cap` bounds the
    /// number of produced systems; `None` on overflow.
    #[must_use]
    pub fn and(&self, other: &ComposedConstraint, cap: usize) -> Option<ComposedConstraint> {
        if self.systems.len().saturating_mul(other.systems.len()) > cap {
            return None;
        }
        let mut systems = Vec::with_capacity(self.systems.len() * other.systems.len());
        for a in &self.systems {
            for b in &other.systems {
                let merged = a.merged(b);
                if !merged.is_trivially_false() {
                    systems.push(merged);
                }
            }
        }
        Some(ComposedConstraint { systems })
    }
}

impl From<SingleConstraint> for ComposedConstraint {
    fn from(c: SingleConstraint) -> Self {
        ComposedConstraint {
            systems: vec![ConstraintSystem::from(c)],
        }
    }
}

impl From<ConstraintSystem> for ComposedConstraint {
    fn from(s: ConstraintSystem) -> Self {
        ComposedConstraint { systems: vec![s] }
    }
}

impl fmt::Display for ComposedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.systems.is_empty() {
            return write!(f, "false");
        }
        for (i, s) in self.systems.iter().enumerate() {
            if i > 0 {
                write!(f, " || ")?;
            }
            write!(f, "({})", s)?;
        }
        Ok(())
    }
}

/// The ordered stack of constraints a solver instance carries.
///
/// Ordering matters: solving is incremental and removal is always "pop the
/// most recently added". Popping an empty stack is a programming error.
#[derive(Clone, Debug, Default)]
pub struct ConstraintStack {
    entries: Vec<ComposedConstraint>,
}

impl ConstraintStack {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        ConstraintStack::default()
    }

    /// Push one composed constraint.
    pub fn push(&mut self, c: ComposedConstraint) {
        self.entries.push(c);
    }

    /// Pop the most recently added constraint.
    pub fn pop(&mut self) -> Result<ComposedConstraint, IncorrectUseError> {
        self.entries
            .pop()
            .ok_or(IncorrectUseError("remove_constraint on an empty stack"))
    }

    /// The stacked constraints, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[ComposedConstraint] {
        &self.entries
    }

    /// Current depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stacked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::PrimitiveType;
    use crate::variable::NumericVariable;
    use num_rational::BigRational;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    fn x_le(bound: i64) -> SingleConstraint {
        // x - bound <= 0
        let mut p = Polynomial::variable(NumericVariable::new("x", PrimitiveType::Int));
        p.add_constant(&rat(-bound));
        SingleConstraint::new(p, Relation::Le)
    }

    #[test]
    fn constant_constraints_decide_themselves() {
        let t = SingleConstraint::new(Polynomial::constant(rat(-1)), Relation::Lt);
        assert_eq!(t.constant_truth(), Some(true));
        let f = SingleConstraint::new(Polynomial::constant(rat(0)), Relation::Lt);
        assert_eq!(f.constant_truth(), Some(false));
        assert_eq!(x_le(3).constant_truth(), None);
    }

    #[test]
    fn systems_fold_trivial_members() {
        let mut s = ConstraintSystem::new();
        s.push(SingleConstraint::new(Polynomial::constant(rat(0)), Relation::Eq));
        assert!(s.is_trivially_true());
        s.push(x_le(5));
        assert_eq!(s.constraints().len(), 1);
        s.push(SingleConstraint::new(Polynomial::constant(rat(2)), Relation::Le));
        assert!(s.is_trivially_false());
    }

    #[test]
    fn dnf_conjunction_distributes() {
        let a = ComposedConstraint::from_systems(vec![
            ConstraintSystem::from(x_le(1)),
            ConstraintSystem::from(x_le(2)),
        ]);
        let b = ComposedConstraint::from(x_le(3));
        let ab = a.and(&b, 64).unwrap();
        assert_eq!(ab.systems().len(), 2);
        assert!(ab.systems().iter().all(|s| s.constraints().len() == 2));
        assert!(a.and(&b, 1).is_none());
    }

    #[test]
    fn stack_rejects_empty_pop() {
        let mut s = ConstraintStack::new();
        assert!(s.pop().is_err());
        s.push(ComposedConstraint::trivially_true());
        assert!(s.pop().is_ok());
        assert!(s.is_empty());
    }
}
