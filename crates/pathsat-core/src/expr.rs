//! Boolean constraint expressions
//!
//! The interpreter builds a [`ConstraintExpression`] per symbolic branch:
//! comparisons of terms combined with conjunction, disjunction and
//! negation. Reference-type membership is carried as an opaque
//! [`TypeConstraint`] for the VM's non-arithmetic reasoning; the arithmetic
//! normalizer rejects it.

use crate::term::Term;
use std::fmt;
use std::sync::Arc;

/// Relational comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CmpOp {
    /// The operator for the negated comparison.
    #[must_use]
    pub fn negated(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// An opaque reference-type membership constraint.
///
/// Consumed as a token by the VM's reference reasoning; never solved
/// arithmetically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeConstraint {
    /// Token identifying the reference value.
    pub reference: Arc<str>,
    /// Class names the reference is (or is not) an instance of.
    pub classes: Vec<Arc<str>>,
    /// Positive membership vs exclusion.
    pub positive: bool,
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {{",
            self.reference,
            if self.positive { "instanceof" } else { "!instanceof" }
        )?;
        for (i, c) in self.classes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "}}")
    }
}

/// A boolean-typed constraint tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintExpression {
    /// Boolean constant.
    Bool(bool),
    /// Relational comparison of two terms.
    Cmp(CmpOp, Term, Term),
    /// Negation.
    Not(Box<ConstraintExpression>),
    /// Conjunction.
    And(Box<ConstraintExpression>, Box<ConstraintExpression>),
    /// Disjunction.
    Or(Box<ConstraintExpression>, Box<ConstraintExpression>),
    /// Opaque reference-type membership.
    Type(TypeConstraint),
}

impl ConstraintExpression {
    /// `lhs == rhs`
    #[must_use]
    pub fn eq(lhs: Term, rhs: Term) -> Self {
        ConstraintExpression::Cmp(CmpOp::Eq, lhs, rhs)
    }

    /// `lhs != rhs`
    #[must_use]
    pub fn ne(lhs: Term, rhs: Term) -> Self {
        ConstraintExpression::Cmp(CmpOp::Ne, lhs, rhs)
    }

    /// `lhs < rhs`
    #[must_use]
    pub fn lt(lhs: Term, rhs: Term) -> Self {
        ConstraintExpression::Cmp(CmpOp::Lt, lhs, rhs)
    }

    /// `lhs <= rhs`
    #[must_use]
    pub fn le(lhs: Term, rhs: Term) -> Self {
        ConstraintExpression::Cmp(CmpOp::Le, lhs, rhs)
    }

    /// `lhs > rhs`
    #[must_use]
    pub fn gt(lhs: Term, rhs: Term) -> Self {
        ConstraintExpression::Cmp(CmpOp::Gt, lhs, rhs)
    }

    /// `lhs >= rhs`
    #[must_use]
    pub fn ge(lhs: Term, rhs: Term) -> Self {
        ConstraintExpression::Cmp(CmpOp::Ge, lhs, rhs)
    }

    /// Conjunction.
    #[must_use]
    pub fn and(a: ConstraintExpression, b: ConstraintExpression) -> Self {
        ConstraintExpression::And(Box::new(a), Box::new(b))
    }

    /// Disjunction.
    #[must_use]
    pub fn or(a: ConstraintExpression, b: ConstraintExpression) -> Self {
        ConstraintExpression::Or(Box::new(a), Box::new(b))
    }

    /// Negation.
    #[must_use]
    pub fn not(e: ConstraintExpression) -> Self {
        ConstraintExpression::Not(Box::new(e))
    }

    /// Conjunction of a sequence; `true` when empty.
    #[must_use]
    pub fn ands(mut es: Vec<ConstraintExpression>) -> Self {
        match es.pop() {
            None => ConstraintExpression::Bool(true),
            Some(last) => es
                .into_iter()
                .rev()
                .fold(last, |acc, e| ConstraintExpression::and(e, acc)),
        }
    }

    /// Disjunction of a sequence; `false` when empty.
    #[must_use]
    pub fn ors(mut es: Vec<ConstraintExpression>) -> Self {
        match es.pop() {
            None => ConstraintExpression::Bool(false),
            Some(last) => es
                .into_iter()
                .rev()
                .fold(last, |acc, e| ConstraintExpression::or(e, acc)),
        }
    }
}

impl fmt::Display for ConstraintExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintExpression::Bool(b) => write!(f, "{}", b),
            ConstraintExpression::Cmp(op, l, r) => write!(f, "({} {} {})", l, op, r),
            ConstraintExpression::Not(e) => write!(f, "!{}", e),
            ConstraintExpression::And(a, b) => write!(f, "({} && {})", a, b),
            ConstraintExpression::Or(a, b) => write!(f, "({} || {})", a, b),
            ConstraintExpression::Type(t) => write!(f, "{}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::PrimitiveType;
    use crate::variable::NumericVariable;

    #[test]
    fn builders_compose() {
        let x = Term::var(NumericVariable::new("x", PrimitiveType::Int));
        let e = ConstraintExpression::ands(vec![
            ConstraintExpression::le(x.clone(), Term::int(1)),
            ConstraintExpression::ge(x.clone(), Term::int(0)),
        ]);
        assert!(matches!(e, ConstraintExpression::And(_, _)));
        assert_eq!(
            ConstraintExpression::ors(vec![]),
            ConstraintExpression::Bool(false)
        );
    }

    #[test]
    fn negated_operators_flip() {
        assert_eq!(CmpOp::Lt.negated(), CmpOp::Ge);
        assert_eq!(CmpOp::Eq.negated(), CmpOp::Ne);
        assert_eq!(CmpOp::Gt.negated().negated(), CmpOp::Gt);
    }
}
