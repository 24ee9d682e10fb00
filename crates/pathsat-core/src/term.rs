//! Immutable term algebra
//!
//! [`Term`] is a closed sum type over the arithmetic operators the
//! interpreter can emit on symbolic operands. Every combinator either folds
//! a constant-only subtree into a constant or allocates a new immutable
//! node; nothing is mutated in place.
//!
//! Terms that cannot be linearized directly (`%`, integer `/`, bitwise
//! operators, shifts, narrowing casts) are eliminated by the normalizer
//! before [`Term::to_polynomial`] runs; reaching the linearizer with one of
//! them is an error, not a silent coercion.

use crate::constant::{BitOp, NumericConstant, PrimitiveType};
use crate::error::{LinearizeError, TypeCheckError};
use crate::poly::Polynomial;
use crate::solution::Solution;
use crate::variable::NumericVariable;
use num_traits::Zero;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// An immutable symbolic expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// A typed constant.
    Constant(NumericConstant),
    /// A symbolic unknown.
    Variable(NumericVariable),
    /// Addition.
    Sum(Arc<Term>, Arc<Term>),
    /// Multiplication.
    Product(Arc<Term>, Arc<Term>),
    /// Division; truncating for integer operands, exact otherwise.
    Quotient(Arc<Term>, Arc<Term>),
    /// Remainder with the dividend's sign.
    Modulo(Arc<Term>, Arc<Term>),
    /// Primitive type cast.
    Cast(PrimitiveType, Arc<Term>),
    /// Bitwise and.
    BitAnd(Arc<Term>, Arc<Term>),
    /// Bitwise or.
    BitOr(Arc<Term>, Arc<Term>),
    /// Bitwise xor.
    BitXor(Arc<Term>, Arc<Term>),
    /// Left shift.
    Shl(Arc<Term>, Arc<Term>),
    /// Arithmetic (sign-propagating) right shift.
    Shr(Arc<Term>, Arc<Term>),
}

macro_rules! fold_or_node {
    ($a:expr, $b:expr, $fold:expr, $node:expr) => {{
        let (a, b) = ($a, $b);
        if let (Term::Constant(x), Term::Constant(y)) = (&a, &b) {
            if let Some(c) = ($fold)(x, y) {
                return Term::Constant(c);
            }
        }
        ($node)(Arc::new(a), Arc::new(b))
    }};
}

impl Term {
    /// An `int` constant term.
    #[must_use]
    pub fn int(v: i32) -> Term {
        Term::Constant(NumericConstant::Int(v))
    }

    /// A `long` constant term.
    #[must_use]
    pub fn long(v: i64) -> Term {
        Term::Constant(NumericConstant::Long(v))
    }

    /// A `double` constant term.
    #[must_use]
    pub fn double(v: f64) -> Term {
        Term::Constant(NumericConstant::Double(v))
    }

    /// A variable term.
    #[must_use]
    pub fn var(v: NumericVariable) -> Term {
        Term::Variable(v)
    }

    /// Addition, folding constant operands.
    #[must_use]
    pub fn sum(a: Term, b: Term) -> Term {
        fold_or_node!(a, b, |x: &NumericConstant, y: &NumericConstant| x.add(y), Term::Sum)
    }

    /// Multiplication, folding constant operands.
    #[must_use]
    pub fn product(a: Term, b: Term) -> Term {
        fold_or_node!(a, b, |x: &NumericConstant, y: &NumericConstant| x.mul(y), Term::Product)
    }

    /// Division, folding constant operands. A constant zero divisor is kept
    /// as a node; the normalizer turns it into an unsatisfiable side
    /// condition.
    #[must_use]
    pub fn quotient(a: Term, b: Term) -> Term {
        fold_or_node!(a, b, |x: &NumericConstant, y: &NumericConstant| x.div(y), Term::Quotient)
    }

    /// Remainder, folding constant operands.
    #[must_use]
    pub fn modulo(a: Term, b: Term) -> Term {
        fold_or_node!(a, b, |x: &NumericConstant, y: &NumericConstant| x.rem(y), Term::Modulo)
    }

    /// Bitwise and, folding constant operands.
    #[must_use]
    pub fn bit_and(a: Term, b: Term) -> Term {
        fold_or_node!(
            a,
            b,
            |x: &NumericConstant, y: &NumericConstant| x.bit(y, BitOp::And),
            Term::BitAnd
        )
    }

    /// Bitwise or, folding constant operands.
    #[must_use]
    pub fn bit_or(a: Term, b: Term) -> Term {
        fold_or_node!(
            a,
            b,
            |x: &NumericConstant, y: &NumericConstant| x.bit(y, BitOp::Or),
            Term::BitOr
        )
    }

    /// Bitwise xor, folding constant operands.
    #[must_use]
    pub fn bit_xor(a: Term, b: Term) -> Term {
        fold_or_node!(
            a,
            b,
            |x: &NumericConstant, y: &NumericConstant| x.bit(y, BitOp::Xor),
            Term::BitXor
        )
    }

    /// Left shift, folding constant operands.
    #[must_use]
    pub fn shl(a: Term, b: Term) -> Term {
        fold_or_node!(
            a,
            b,
            |x: &NumericConstant, y: &NumericConstant| x.shift(y, true),
            Term::Shl
        )
    }

    /// Arithmetic right shift, folding constant operands.
    #[must_use]
    pub fn shr(a: Term, b: Term) -> Term {
        fold_or_node!(
            a,
            b,
            |x: &NumericConstant, y: &NumericConstant| x.shift(y, false),
            Term::Shr
        )
    }

    /// Type cast, folding constant operands.
    #[must_use]
    pub fn cast(target: PrimitiveType, t: Term) -> Term {
        if let Term::Constant(c) = &t {
            if let Some(folded) = c.cast(target) {
                return Term::Constant(folded);
            }
        }
        Term::Cast(target, Arc::new(t))
    }

    /// Arithmetic negation as multiplication by -1.
    #[must_use]
    pub fn neg(t: Term) -> Term {
        if let Term::Constant(c) = &t {
            if let Some(n) = c.neg() {
                return Term::Constant(n);
            }
        }
        Term::product(Term::int(-1), t)
    }

    /// `a - b`.
    #[must_use]
    pub fn difference(a: Term, b: Term) -> Term {
        Term::sum(a, Term::neg(b))
    }

    /// The constant payload, if this term is a constant.
    #[must_use]
    pub fn as_constant(&self) -> Option<&NumericConstant> {
        match self {
            Term::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Type-check this term, returning its primitive type.
    ///
    /// Fails fast on incompatible operand types; nothing is coerced
    /// silently.
    pub fn check_types(&self) -> Result<PrimitiveType, TypeCheckError> {
        match self {
            Term::Constant(c) => Ok(c.ty()),
            Term::Variable(v) => Ok(v.ty()),
            Term::Sum(a, b) | Term::Product(a, b) | Term::Quotient(a, b) => {
                let (ta, tb) = (a.check_types()?, b.check_types()?);
                PrimitiveType::promote(ta, tb)
                    .ok_or_else(|| TypeCheckError::BooleanOperand(self.to_string()))
            }
            Term::Modulo(a, b) => self.check_integer_binop("%", a, b),
            Term::BitAnd(a, b) => self.check_integer_binop("&", a, b),
            Term::BitOr(a, b) => self.check_integer_binop("|", a, b),
            Term::BitXor(a, b) => self.check_integer_binop("^", a, b),
            Term::Shl(a, b) | Term::Shr(a, b) => {
                let op = if matches!(self, Term::Shl(_, _)) { "<<" } else { ">>" };
                let ta = a.check_types()?;
                let tb = b.check_types()?;
                for t in [ta, tb] {
                    if !t.is_integer() {
                        return Err(TypeCheckError::IntegerOperatorMisuse {
                            op,
                            found: t.to_string(),
                        });
                    }
                }
                // A shift has the type of its left operand.
                Ok(ta)
            }
            Term::Cast(target, inner) => {
                let ti = inner.check_types()?;
                if !ti.is_numeric() || !target.is_numeric() {
                    return Err(TypeCheckError::BooleanOperand(self.to_string()));
                }
                Ok(*target)
            }
        }
    }

    fn check_integer_binop(
        &self,
        op: &'static str,
        a: &Term,
        b: &Term,
    ) -> Result<PrimitiveType, TypeCheckError> {
        let ta = a.check_types()?;
        let tb = b.check_types()?;
        for t in [ta, tb] {
            if !t.is_integer() {
                return Err(TypeCheckError::IntegerOperatorMisuse {
                    op,
                    found: t.to_string(),
                });
            }
        }
        PrimitiveType::promote(ta, tb)
            .ok_or_else(|| TypeCheckError::BooleanOperand(self.to_string()))
    }

    /// Collect every variable occurring in this term.
    pub fn variables(&self, out: &mut BTreeSet<NumericVariable>) {
        match self {
            Term::Constant(_) => {}
            Term::Variable(v) => {
                out.insert(v.clone());
            }
            Term::Sum(a, b)
            | Term::Product(a, b)
            | Term::Quotient(a, b)
            | Term::Modulo(a, b)
            | Term::BitAnd(a, b)
            | Term::BitOr(a, b)
            | Term::BitXor(a, b)
            | Term::Shl(a, b)
            | Term::Shr(a, b) => {
                a.variables(out);
                b.variables(out);
            }
            Term::Cast(_, inner) => inner.variables(out),
        }
    }

    /// Substitute one known variable during path-condition construction.
    /// The result may still contain other variables.
    #[must_use]
    pub fn substitute_assignment(&self, var: &NumericVariable, value: &NumericConstant) -> Term {
        self.rebuild(&mut |t| match t {
            Term::Variable(v) if v == var => Some(Term::Constant(*value)),
            _ => None,
        })
    }

    /// Substitute every variable bound in a solver [`Solution`].
    ///
    /// With `zero_fill` set, variables absent from the solution are replaced
    /// by the zero of their type. This is the best-effort mode used to
    /// produce concrete test inputs; it is not suitable for
    /// correctness-critical checks.
    #[must_use]
    pub fn substitute_solution(&self, solution: &Solution, zero_fill: bool) -> Term {
        self.rebuild(&mut |t| match t {
            Term::Variable(v) => match solution.get(v) {
                Some(c) => Some(Term::Constant(*c)),
                None if zero_fill => Some(Term::Constant(NumericConstant::zero_of(v.ty()))),
                None => None,
            },
            _ => None,
        })
    }

    /// Bottom-up rebuild through the folding constructors. `leaf` may
    /// replace any node; children are processed first.
    fn rebuild(&self, leaf: &mut impl FnMut(&Term) -> Option<Term>) -> Term {
        if let Some(t) = leaf(self) {
            return t;
        }
        match self {
            Term::Constant(_) | Term::Variable(_) => self.clone(),
            Term::Sum(a, b) => Term::sum(a.rebuild(leaf), b.rebuild(leaf)),
            Term::Product(a, b) => Term::product(a.rebuild(leaf), b.rebuild(leaf)),
            Term::Quotient(a, b) => Term::quotient(a.rebuild(leaf), b.rebuild(leaf)),
            Term::Modulo(a, b) => Term::modulo(a.rebuild(leaf), b.rebuild(leaf)),
            Term::BitAnd(a, b) => Term::bit_and(a.rebuild(leaf), b.rebuild(leaf)),
            Term::BitOr(a, b) => Term::bit_or(a.rebuild(leaf), b.rebuild(leaf)),
            Term::BitXor(a, b) => Term::bit_xor(a.rebuild(leaf), b.rebuild(leaf)),
            Term::Shl(a, b) => Term::shl(a.rebuild(leaf), b.rebuild(leaf)),
            Term::Shr(a, b) => Term::shr(a.rebuild(leaf), b.rebuild(leaf)),
            Term::Cast(ty, inner) => Term::cast(*ty, inner.rebuild(leaf)),
        }
    }

    /// Linearize this term into a [`Polynomial`].
    ///
    /// Operators excluded from direct solving (`%`, integer `/`, bitwise
    /// operators, shifts) must have been eliminated by normalization first;
    /// they produce an error here. Casts that remain after elimination are
    /// numeric identities and are looked through.
    pub fn to_polynomial(&self) -> Result<Polynomial, LinearizeError> {
        match self {
            Term::Constant(NumericConstant::Boolean(_)) => {
                Err(LinearizeError::UnsupportedOperator("boolean constant"))
            }
            Term::Constant(c) => c
                .to_rational()
                .map(Polynomial::constant)
                .ok_or_else(|| LinearizeError::NonFiniteConstant(c.to_string())),
            Term::Variable(v) => {
                if v.ty().is_numeric() {
                    Ok(Polynomial::variable(v.clone()))
                } else {
                    Err(LinearizeError::UnsupportedOperator("boolean variable"))
                }
            }
            Term::Sum(a, b) => Ok(a.to_polynomial()?.add(&b.to_polynomial()?)),
            Term::Product(a, b) => {
                let pa = a.to_polynomial()?;
                let pb = b.to_polynomial()?;
                if let Some(c) = pa.as_constant() {
                    Ok(pb.scale(c))
                } else if let Some(c) = pb.as_constant() {
                    Ok(pa.scale(c))
                } else {
                    Err(LinearizeError::NonLinear(self.to_string()))
                }
            }
            Term::Quotient(a, b) => {
                let ty = self
                    .check_types()
                    .map_err(|_| LinearizeError::NonLinear(self.to_string()))?;
                if ty.is_integer() {
                    return Err(LinearizeError::UnsupportedOperator("integer division"));
                }
                let pb = b.to_polynomial()?;
                match pb.as_constant() {
                    Some(c) if c.is_zero() => {
                        Err(LinearizeError::DivisionByZero(self.to_string()))
                    }
                    Some(c) => Ok(a.to_polynomial()?.scale(&c.recip())),
                    None => Err(LinearizeError::NonLinear(self.to_string())),
                }
            }
            Term::Modulo(_, _) => Err(LinearizeError::UnsupportedOperator("%")),
            Term::BitAnd(_, _) => Err(LinearizeError::UnsupportedOperator("&")),
            Term::BitOr(_, _) => Err(LinearizeError::UnsupportedOperator("|")),
            Term::BitXor(_, _) => Err(LinearizeError::UnsupportedOperator("^")),
            Term::Shl(_, _) => Err(LinearizeError::UnsupportedOperator("<<")),
            Term::Shr(_, _) => Err(LinearizeError::UnsupportedOperator(">>")),
            Term::Cast(_, inner) => inner.to_polynomial(),
        }
    }

    /// Rewrite this term so that no denominator contains a non-constant
    /// denominator, multiplying through and recording in `denominators`
    /// every divisor that must later be asserted nonzero.
    ///
    /// The result is either quotient-free (up to opaque operands of `%`,
    /// integer `/`, casts, bitwise operators) or a single top-level real
    /// quotient `num / den`.
    #[must_use]
    pub fn clear_multi_fractions(&self, denominators: &mut Vec<Term>) -> Term {
        let (num, den) = self.fraction_form(denominators);
        match den {
            None => num,
            Some(d) => Term::quotient(num, d),
        }
    }

    /// `(num, den)` with `self == num / den`; `None` denominator means 1.
    fn fraction_form(&self, dens: &mut Vec<Term>) -> (Term, Option<Term>) {
        match self {
            Term::Constant(_) | Term::Variable(_) => (self.clone(), None),
            Term::Sum(a, b) => {
                let (na, da) = a.fraction_form(dens);
                let (nb, db) = b.fraction_form(dens);
                match (da, db) {
                    (None, None) => (Term::sum(na, nb), None),
                    (Some(d), None) => (Term::sum(na, Term::product(nb, d.clone())), Some(d)),
                    (None, Some(e)) => (Term::sum(Term::product(na, e.clone()), nb), Some(e)),
                    (Some(d), Some(e)) => (
                        Term::sum(
                            Term::product(na, e.clone()),
                            Term::product(nb, d.clone()),
                        ),
                        Some(Term::product(d, e)),
                    ),
                }
            }
            Term::Product(a, b) => {
                let (na, da) = a.fraction_form(dens);
                let (nb, db) = b.fraction_form(dens);
                (Term::product(na, nb), combine_dens(da, db))
            }
            Term::Quotient(a, b) => {
                let integral = self
                    .check_types()
                    .map(PrimitiveType::is_integer)
                    .unwrap_or(false);
                if integral {
                    // Truncating division is opaque here; the normalizer
                    // substitutes it.
                    let ca = a.clear_multi_fractions(dens);
                    let cb = b.clear_multi_fractions(dens);
                    return (Term::quotient(ca, cb), None);
                }
                let (na, da) = a.fraction_form(dens);
                let (nb, db) = b.fraction_form(dens);
                match nb.as_constant() {
                    Some(c) if !c.is_zero() => {}
                    _ => dens.push(nb.clone()),
                }
                let num = match db {
                    None => na,
                    Some(e) => Term::product(na, e),
                };
                (num, combine_dens(da, Some(nb)))
            }
            Term::Modulo(a, b) => (
                Term::modulo(a.clear_multi_fractions(dens), b.clear_multi_fractions(dens)),
                None,
            ),
            Term::BitAnd(a, b) => (
                Term::bit_and(a.clear_multi_fractions(dens), b.clear_multi_fractions(dens)),
                None,
            ),
            Term::BitOr(a, b) => (
                Term::bit_or(a.clear_multi_fractions(dens), b.clear_multi_fractions(dens)),
                None,
            ),
            Term::BitXor(a, b) => (
                Term::bit_xor(a.clear_multi_fractions(dens), b.clear_multi_fractions(dens)),
                None,
            ),
            Term::Shl(a, b) => (
                Term::shl(a.clear_multi_fractions(dens), b.clear_multi_fractions(dens)),
                None,
            ),
            Term::Shr(a, b) => (
                Term::shr(a.clear_multi_fractions(dens), b.clear_multi_fractions(dens)),
                None,
            ),
            Term::Cast(ty, inner) => (Term::cast(*ty, inner.clear_multi_fractions(dens)), None),
        }
    }
}

fn combine_dens(a: Option<Term>, b: Option<Term>) -> Option<Term> {
    match (a, b) {
        (None, None) => None,
        (Some(d), None) | (None, Some(d)) => Some(d),
        (Some(d), Some(e)) => Some(Term::product(d, e)),
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(c) => write!(f, "{}", c),
            Term::Variable(v) => write!(f, "{}", v),
            Term::Sum(a, b) => write!(f, "({} + {})", a, b),
            Term::Product(a, b) => write!(f, "({} * {})", a, b),
            Term::Quotient(a, b) => write!(f, "({} / {})", a, b),
            Term::Modulo(a, b) => write!(f, "({} % {})", a, b),
            Term::BitAnd(a, b) => write!(f, "({} & {})", a, b),
            Term::BitOr(a, b) => write!(f, "({} | {})", a, b),
            Term::BitXor(a, b) => write!(f, "({} ^ {})", a, b),
            Term::Shl(a, b) => write!(f, "({} << {})", a, b),
            Term::Shr(a, b) => write!(f, "({} >> {})", a, b),
            Term::Cast(ty, inner) => write!(f, "(({}) {})", ty, inner),
        }
    }
}
