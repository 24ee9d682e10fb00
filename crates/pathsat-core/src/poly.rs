//! Linear polynomials over exact rationals
//!
//! The normal form is a rational constant plus a map from variable to
//! coefficient. Zero coefficients are never stored and no monomial repeats;
//! iteration order is deterministic.

use crate::error::IncompleteSolutionError;
use crate::variable::{NumericKind, NumericVariable};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::collections::BTreeMap;
use std::fmt;

/// A linear form `constant + Σ coeff · var`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Polynomial {
    constant: BigRational,
    terms: BTreeMap<NumericVariable, BigRational>,
}

impl Polynomial {
    /// The zero polynomial.
    #[must_use]
    pub fn zero() -> Self {
        Polynomial::default()
    }

    /// A constant polynomial.
    #[must_use]
    pub fn constant(c: BigRational) -> Self {
        Polynomial {
            constant: c,
            terms: BTreeMap::new(),
        }
    }

    /// The polynomial `1 · var`.
    #[must_use]
    pub fn variable(var: NumericVariable) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(var, BigRational::one());
        Polynomial {
            constant: BigRational::zero(),
            terms,
        }
    }

    /// Add `coeff · var`, dropping the monomial if it cancels to zero.
    pub fn add_term(&mut self, var: NumericVariable, coeff: BigRational) {
        if coeff.is_zero() {
            return;
        }
        let entry = self.terms.entry(var.clone()).or_insert_with(BigRational::zero);
        *entry += coeff;
        if entry.is_zero() {
            self.terms.remove(&var);
        }
    }

    /// Add a constant offset.
    pub fn add_constant(&mut self, c: &BigRational) {
        self.constant += c;
    }

    /// Polynomial sum.
    #[must_use]
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut out = self.clone();
        out.constant += &other.constant;
        for (v, c) in &other.terms {
            out.add_term(v.clone(), c.clone());
        }
        out
    }

    /// Polynomial difference.
    #[must_use]
    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.neg())
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> Polynomial {
        self.scale(&-BigRational::one())
    }

    /// Multiply every coefficient and the constant by `factor`.
    #[must_use]
    pub fn scale(&self, factor: &BigRational) -> Polynomial {
        if factor.is_zero() {
            return Polynomial::zero();
        }
        Polynomial {
            constant: &self.constant * factor,
            terms: self
                .terms
                .iter()
                .map(|(v, c)| (v.clone(), c * factor))
                .collect(),
        }
    }

    /// The constant term.
    #[must_use]
    pub fn constant_part(&self) -> &BigRational {
        &self.constant
    }

    /// The coefficient of `var` (zero if absent).
    #[must_use]
    pub fn coeff(&self, var: &NumericVariable) -> BigRational {
        self.terms.get(var).cloned().unwrap_or_else(BigRational::zero)
    }

    /// If this polynomial has no variables, its constant value.
    #[must_use]
    pub fn as_constant(&self) -> Option<&BigRational> {
        if self.terms.is_empty() {
            Some(&self.constant)
        } else {
            None
        }
    }

    /// Whether any variable occurs.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate monomials in deterministic variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&NumericVariable, &BigRational)> {
        self.terms.iter()
    }

    /// Number of variable monomials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the polynomial is the bare constant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether every occurring variable is integer-valued.
    #[must_use]
    pub fn all_integer_vars(&self) -> bool {
        self.terms.keys().all(|v| v.kind() == NumericKind::Integer)
    }

    /// Least common multiple of the coefficient denominators (variables
    /// only, not the constant).
    #[must_use]
    pub fn coeff_denominator_lcm(&self) -> BigInt {
        self.terms
            .values()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()))
    }

    /// Evaluate at the given rational bindings.
    pub fn eval(
        &self,
        bindings: &BTreeMap<NumericVariable, BigRational>,
    ) -> Result<BigRational, IncompleteSolutionError> {
        let mut sum = self.constant.clone();
        for (v, c) in &self.terms {
            let value = bindings.get(v).ok_or_else(|| IncompleteSolutionError {
                variable: v.name().to_string(),
            })?;
            sum += c * value;
        }
        Ok(sum)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (v, c) in &self.terms {
            if first {
                write!(f, "{}*{}", c, v)?;
                first = false;
            } else {
                write!(f, " + {}*{}", c, v)?;
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if !self.constant.is_zero() {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}
