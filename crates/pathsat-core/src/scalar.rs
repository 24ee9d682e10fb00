//! Scalar abstraction over the solver's coefficient arithmetic
//!
//! The tableau and cut machinery is generic over [`Scalar`], with two
//! backends:
//! - [`BigRational`] for exact arithmetic (no rounding error, higher cost)
//! - [`Approx`], a total-ordered `f64` wrapper with a small pivot epsilon
//!   that guards pivot selection against float noise
//!
//! The configurable rounding-error threshold used to accept or reject float
//! solutions is solver configuration, not part of the scalar type.

use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Coefficient arithmetic required by the simplex and cut layers.
pub trait Scalar:
    Clone
    + Eq
    + Ord
    + fmt::Debug
    + fmt::Display
    + Zero
    + One
    + Neg<Output = Self>
    + Sub<Output = Self>
    + Div<Output = Self>
{
    /// Whether this backend is exact (no rounding error).
    const EXACT: bool;

    /// Convert from an exact rational coefficient.
    fn from_rational(r: &BigRational) -> Self;

    /// Convert from a machine integer.
    fn from_int(n: i64) -> Self;

    /// The exact rational view of this value.
    fn to_rational(&self) -> BigRational;

    /// Multiplicative inverse. Callers must guard against pivot-zero values.
    fn recip(&self) -> Self;

    /// Largest integral value not greater than `self`.
    fn floor(&self) -> Self;

    /// Absolute value.
    fn abs(&self) -> Self;

    /// Whether the value is indistinguishable from zero for pivoting
    /// purposes. Exact backend: exactly zero.
    fn is_pivot_zero(&self) -> bool;
}

/// Sign of a scalar under the backend's pivot-zero tolerance:
/// -1, 0 or +1.
pub fn pivot_sign<S: Scalar>(s: &S) -> i8 {
    if s.is_pivot_zero() {
        0
    } else if *s < S::zero() {
        -1
    } else {
        1
    }
}

impl Scalar for BigRational {
    const EXACT: bool = true;

    fn from_rational(r: &BigRational) -> Self {
        r.clone()
    }

    fn from_int(n: i64) -> Self {
        BigRational::from_integer(n.into())
    }

    fn to_rational(&self) -> BigRational {
        self.clone()
    }

    fn recip(&self) -> Self {
        BigRational::recip(self)
    }

    fn floor(&self) -> Self {
        BigRational::floor(self)
    }

    fn abs(&self) -> Self {
        Signed::abs(self)
    }

    fn is_pivot_zero(&self) -> bool {
        self.is_zero()
    }
}

/// Total-ordered finite `f64` used by the double-precision backend.
///
/// Negative zero is normalized away on construction so that ordering and
/// equality agree with the exact backend on the values the solver produces.
/// NaN never arises: divisions are guarded by [`Scalar::is_pivot_zero`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Approx(f64);

/// Values closer to zero than this are treated as zero during pivoting.
const PIVOT_EPS: f64 = 1e-11;

impl Approx {
    /// Wrap a finite float, normalizing negative zero.
    #[must_use]
    pub fn new(v: f64) -> Self {
        Approx(if v == 0.0 { 0.0 } else { v })
    }

    /// The raw float value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Approx {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Approx {}

impl PartialOrd for Approx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Approx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Approx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Approx {
    type Output = Approx;
    fn add(self, rhs: Approx) -> Approx {
        Approx::new(self.0 + rhs.0)
    }
}

impl Sub for Approx {
    type Output = Approx;
    fn sub(self, rhs: Approx) -> Approx {
        Approx::new(self.0 - rhs.0)
    }
}

impl Mul for Approx {
    type Output = Approx;
    fn mul(self, rhs: Approx) -> Approx {
        Approx::new(self.0 * rhs.0)
    }
}

impl Div for Approx {
    type Output = Approx;
    fn div(self, rhs: Approx) -> Approx {
        Approx::new(self.0 / rhs.0)
    }
}

impl Neg for Approx {
    type Output = Approx;
    fn neg(self) -> Approx {
        Approx::new(-self.0)
    }
}

impl Zero for Approx {
    fn zero() -> Self {
        Approx(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl One for Approx {
    fn one() -> Self {
        Approx(1.0)
    }
}

impl Scalar for Approx {
    const EXACT: bool = false;

    fn from_rational(r: &BigRational) -> Self {
        match r.to_f64() {
            Some(v) if v.is_finite() => Approx::new(v),
            // Saturate out-of-range magnitudes; the post-solving pass
            // rejects anything this produces that violates a constraint.
            Some(v) if v > 0.0 => Approx::new(f64::MAX),
            Some(_) => Approx::new(f64::MIN),
            None => Approx::new(0.0),
        }
    }

    fn from_int(n: i64) -> Self {
        Approx::new(n as f64)
    }

    fn to_rational(&self) -> BigRational {
        BigRational::from_float(self.0).unwrap_or_else(BigRational::zero)
    }

    fn recip(&self) -> Self {
        Approx::new(1.0 / self.0)
    }

    fn floor(&self) -> Self {
        Approx::new(self.0.floor())
    }

    fn abs(&self) -> Self {
        Approx::new(self.0.abs())
    }

    fn is_pivot_zero(&self) -> bool {
        self.0.abs() < PIVOT_EPS
    }
}
