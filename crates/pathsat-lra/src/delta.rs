//! Delta-rationals: scalars extended by a symbolic infinitesimal
//!
//! A strict bound `Σ a·x < b` shares the tableau representation of
//! `Σ a·x ≤ b − δ` for an infinitesimally small δ > 0. [`Delta`] carries
//! the δ coefficient next to the rational magnitude; comparisons are
//! lexicographic. A concrete δ small enough for every row is chosen only
//! when a model is extracted.

use pathsat_core::scalar::{pivot_sign, Scalar};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// `real + eps·δ` for a symbolic infinitesimal δ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta<S> {
    /// Rational magnitude.
    pub real: S,
    /// Coefficient of the infinitesimal.
    pub eps: S,
}

impl<S: Scalar> Delta<S> {
    /// The zero value.
    #[must_use]
    pub fn zero() -> Self {
        Delta {
            real: S::zero(),
            eps: S::zero(),
        }
    }

    /// A value with no infinitesimal part.
    #[must_use]
    pub fn from_real(real: S) -> Self {
        Delta {
            real,
            eps: S::zero(),
        }
    }

    /// `real − δ`: the right-hand side of a strict upper bound.
    #[must_use]
    pub fn strict(real: S) -> Self {
        Delta {
            real,
            eps: -S::one(),
        }
    }

    /// Scale both parts by `k`.
    #[must_use]
    pub fn scale(&self, k: &S) -> Self {
        Delta {
            real: self.real.clone() * k.clone(),
            eps: self.eps.clone() * k.clone(),
        }
    }

    /// Sign under the backend's pivot tolerance, ordering real before
    /// infinitesimal parts.
    #[must_use]
    pub fn sign(&self) -> i8 {
        match pivot_sign(&self.real) {
            0 => pivot_sign(&self.eps),
            s => s,
        }
    }

    /// Lexicographic comparison via the sign of the difference.
    #[must_use]
    pub fn lex_cmp(&self, other: &Self) -> Ordering {
        match (self.clone() - other.clone()).sign() {
            -1 => Ordering::Less,
            0 => Ordering::Equal,
            _ => Ordering::Greater,
        }
    }

    /// Evaluate at a concrete positive δ.
    #[must_use]
    pub fn concretize(&self, delta: &S) -> S {
        self.real.clone() + self.eps.clone() * delta.clone()
    }
}

impl<S: Scalar> Add for Delta<S> {
    type Output = Delta<S>;
    fn add(self, rhs: Delta<S>) -> Delta<S> {
        Delta {
            real: self.real + rhs.real,
            eps: self.eps + rhs.eps,
        }
    }
}

impl<S: Scalar> Sub for Delta<S> {
    type Output = Delta<S>;
    fn sub(self, rhs: Delta<S>) -> Delta<S> {
        Delta {
            real: self.real - rhs.real,
            eps: self.eps - rhs.eps,
        }
    }
}

impl<S: Scalar> Neg for Delta<S> {
    type Output = Delta<S>;
    fn neg(self) -> Delta<S> {
        Delta {
            real: -self.real,
            eps: -self.eps,
        }
    }
}

impl<S: Scalar> fmt::Display for Delta<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.eps.is_zero() {
            write!(f, "{}", self.real)
        } else if self.eps < S::zero() {
            write!(f, "{} - {}δ", self.real, -self.eps.clone())
        } else {
            write!(f, "{} + {}δ", self.real, self.eps)
        }
    }
}
