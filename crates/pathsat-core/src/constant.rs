//! Typed immutable scalar constants
//!
//! Constants carry the primitive type of the bytecode value they came from.
//! Equality is value equality per type; nothing in the solver relies on
//! interning or reference identity. Floats hash by bit pattern so constants
//! can key the substitution table.

use crate::variable::NumericKind;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Primitive numeric types of the interpreted language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveType {
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit IEEE float
    Float,
    /// 64-bit IEEE float
    Double,
    /// Boolean, used only by predicates
    Boolean,
}

impl PrimitiveType {
    /// Whether values of this type are integer-valued.
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(self, PrimitiveType::Int | PrimitiveType::Long)
    }

    /// Whether this type takes part in arithmetic at all.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        self != PrimitiveType::Boolean
    }

    /// The numeric kind (integer-valued vs real-valued) of this type.
    #[must_use]
    pub fn kind(self) -> NumericKind {
        if self.is_integer() {
            NumericKind::Integer
        } else {
            NumericKind::Real
        }
    }

    /// Binary numeric promotion. `None` if either side is boolean.
    #[must_use]
    pub fn promote(a: PrimitiveType, b: PrimitiveType) -> Option<PrimitiveType> {
        use PrimitiveType::*;
        if a == Boolean || b == Boolean {
            return None;
        }
        Some(match (a, b) {
            (Double, _) | (_, Double) => Double,
            (Float, _) | (_, Float) => Float,
            (Long, _) | (_, Long) => Long,
            _ => Int,
        })
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

/// A typed immutable scalar value.
#[derive(Clone, Copy, Debug)]
pub enum NumericConstant {
    /// 32-bit signed integer value
    Int(i32),
    /// 64-bit signed integer value
    Long(i64),
    /// 32-bit float value
    Float(f32),
    /// 64-bit float value
    Double(f64),
    /// Boolean value, only meaningful in predicates
    Boolean(bool),
}

impl PartialEq for NumericConstant {
    fn eq(&self, other: &Self) -> bool {
        use NumericConstant::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Boolean(a), Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for NumericConstant {}

impl Hash for NumericConstant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use NumericConstant::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Int(v) => v.hash(state),
            Long(v) => v.hash(state),
            Float(v) => v.to_bits().hash(state),
            Double(v) => v.to_bits().hash(state),
            Boolean(v) => v.hash(state),
        }
    }
}

impl fmt::Display for NumericConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericConstant::Int(v) => write!(f, "{}", v),
            NumericConstant::Long(v) => write!(f, "{}L", v),
            NumericConstant::Float(v) => write!(f, "{}F", v),
            NumericConstant::Double(v) => write!(f, "{}", v),
            NumericConstant::Boolean(v) => write!(f, "{}", v),
        }
    }
}

/// Saturating conversion from a big integer.
fn big_to_i64(v: &BigInt) -> i64 {
    v.to_i64().unwrap_or(if v.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

impl NumericConstant {
    /// The primitive type of this constant.
    #[must_use]
    pub fn ty(&self) -> PrimitiveType {
        match self {
            NumericConstant::Int(_) => PrimitiveType::Int,
            NumericConstant::Long(_) => PrimitiveType::Long,
            NumericConstant::Float(_) => PrimitiveType::Float,
            NumericConstant::Double(_) => PrimitiveType::Double,
            NumericConstant::Boolean(_) => PrimitiveType::Boolean,
        }
    }

    /// The numeric kind of this constant's type.
    #[must_use]
    pub fn kind(&self) -> NumericKind {
        self.ty().kind()
    }

    /// Whether this constant is numerically zero. Booleans are never zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            NumericConstant::Int(v) => *v == 0,
            NumericConstant::Long(v) => *v == 0,
            NumericConstant::Float(v) => *v == 0.0,
            NumericConstant::Double(v) => *v == 0.0,
            NumericConstant::Boolean(_) => false,
        }
    }

    /// Exact rational view. `None` for booleans and non-finite floats.
    #[must_use]
    pub fn to_rational(&self) -> Option<BigRational> {
        match self {
            NumericConstant::Int(v) => Some(BigRational::from_integer((*v).into())),
            NumericConstant::Long(v) => Some(BigRational::from_integer((*v).into())),
            NumericConstant::Float(v) => BigRational::from_float(*v as f64),
            NumericConstant::Double(v) => BigRational::from_float(*v),
            NumericConstant::Boolean(_) => None,
        }
    }

    /// Build a constant of the given type from an exact rational, truncating
    /// toward zero for integer types and rounding for float types.
    #[must_use]
    pub fn from_rational(ty: PrimitiveType, r: &BigRational) -> NumericConstant {
        match ty {
            PrimitiveType::Int => {
                let i = big_to_i64(&r.to_integer());
                NumericConstant::Int(i as i32)
            }
            PrimitiveType::Long => NumericConstant::Long(big_to_i64(&r.to_integer())),
            PrimitiveType::Float => {
                NumericConstant::Float(r.to_f64().unwrap_or(0.0) as f32)
            }
            PrimitiveType::Double => NumericConstant::Double(r.to_f64().unwrap_or(0.0)),
            PrimitiveType::Boolean => NumericConstant::Boolean(!r.is_zero()),
        }
    }

    /// The zero constant of a numeric type.
    #[must_use]
    pub fn zero_of(ty: PrimitiveType) -> NumericConstant {
        match ty {
            PrimitiveType::Int => NumericConstant::Int(0),
            PrimitiveType::Long => NumericConstant::Long(0),
            PrimitiveType::Float => NumericConstant::Float(0.0),
            PrimitiveType::Double => NumericConstant::Double(0.0),
            PrimitiveType::Boolean => NumericConstant::Boolean(false),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            NumericConstant::Int(v) => Some(*v as i64),
            NumericConstant::Long(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            NumericConstant::Int(v) => Some(*v as f64),
            NumericConstant::Long(v) => Some(*v as f64),
            NumericConstant::Float(v) => Some(*v as f64),
            NumericConstant::Double(v) => Some(*v),
            NumericConstant::Boolean(_) => None,
        }
    }

    fn promoted_with(&self, other: &NumericConstant) -> Option<PrimitiveType> {
        PrimitiveType::promote(self.ty(), other.ty())
    }

    /// Fold `self + other`. `None` if the operands do not fold.
    #[must_use]
    pub fn add(&self, other: &NumericConstant) -> Option<NumericConstant> {
        self.fold_int_float(
            other,
            |a, b| Some(a.wrapping_add(b)),
            |a, b| Some(a + b),
        )
    }

    /// Fold `self * other`.
    #[must_use]
    pub fn mul(&self, other: &NumericConstant) -> Option<NumericConstant> {
        self.fold_int_float(
            other,
            |a, b| Some(a.wrapping_mul(b)),
            |a, b| Some(a * b),
        )
    }

    /// Fold `self / other`. Integer division truncates toward zero and does
    /// not fold when the divisor is zero.
    #[must_use]
    pub fn div(&self, other: &NumericConstant) -> Option<NumericConstant> {
        self.fold_int_float(
            other,
            |a, b| if b == 0 { None } else { Some(a.wrapping_div(b)) },
            |a, b| Some(a / b),
        )
    }

    /// Fold `self % other`. Integer remainder keeps the dividend's sign and
    /// does not fold when the divisor is zero.
    #[must_use]
    pub fn rem(&self, other: &NumericConstant) -> Option<NumericConstant> {
        self.fold_int_float(
            other,
            |a, b| if b == 0 { None } else { Some(a.wrapping_rem(b)) },
            |a, b| Some(a % b),
        )
    }

    /// Fold arithmetic negation.
    #[must_use]
    pub fn neg(&self) -> Option<NumericConstant> {
        match self {
            NumericConstant::Int(v) => Some(NumericConstant::Int(v.wrapping_neg())),
            NumericConstant::Long(v) => Some(NumericConstant::Long(v.wrapping_neg())),
            NumericConstant::Float(v) => Some(NumericConstant::Float(-v)),
            NumericConstant::Double(v) => Some(NumericConstant::Double(-v)),
            NumericConstant::Boolean(_) => None,
        }
    }

    /// Fold a bitwise operation over integer operands.
    #[must_use]
    pub fn bit(&self, other: &NumericConstant, op: BitOp) -> Option<NumericConstant> {
        let ty = self.promoted_with(other)?;
        if !ty.is_integer() {
            return None;
        }
        let (a, b) = (self.as_i64()?, other.as_i64()?);
        let v = match op {
            BitOp::And => a & b,
            BitOp::Or => a | b,
            BitOp::Xor => a ^ b,
        };
        Some(Self::int_of(ty, v))
    }

    /// Fold a shift. The distance is masked per the shifted type's width.
    #[must_use]
    pub fn shift(&self, distance: &NumericConstant, left: bool) -> Option<NumericConstant> {
        if !self.ty().is_integer() || !distance.ty().is_integer() {
            return None;
        }
        let d = distance.as_i64()?;
        match self {
            NumericConstant::Int(v) => {
                let d = (d & 31) as u32;
                Some(NumericConstant::Int(if left { v.wrapping_shl(d) } else { v.wrapping_shr(d) }))
            }
            NumericConstant::Long(v) => {
                let d = (d & 63) as u32;
                Some(NumericConstant::Long(if left { v.wrapping_shl(d) } else { v.wrapping_shr(d) }))
            }
            _ => None,
        }
    }

    /// Fold a cast to `target`. Integer narrowing truncates, real-to-integer
    /// casts truncate toward zero, per the interpreted language.
    #[must_use]
    pub fn cast(&self, target: PrimitiveType) -> Option<NumericConstant> {
        if !self.ty().is_numeric() || !target.is_numeric() {
            return None;
        }
        Some(match target {
            PrimitiveType::Int => NumericConstant::Int(match self {
                NumericConstant::Int(v) => *v,
                NumericConstant::Long(v) => *v as i32,
                NumericConstant::Float(v) => *v as i32,
                NumericConstant::Double(v) => *v as i32,
                NumericConstant::Boolean(_) => return None,
            }),
            PrimitiveType::Long => NumericConstant::Long(match self {
                NumericConstant::Int(v) => *v as i64,
                NumericConstant::Long(v) => *v,
                NumericConstant::Float(v) => *v as i64,
                NumericConstant::Double(v) => *v as i64,
                NumericConstant::Boolean(_) => return None,
            }),
            PrimitiveType::Float => NumericConstant::Float(self.as_f64()? as f32),
            PrimitiveType::Double => NumericConstant::Double(self.as_f64()?),
            PrimitiveType::Boolean => return None,
        })
    }

    fn int_of(ty: PrimitiveType, v: i64) -> NumericConstant {
        match ty {
            PrimitiveType::Int => NumericConstant::Int(v as i32),
            _ => NumericConstant::Long(v),
        }
    }

    fn fold_int_float(
        &self,
        other: &NumericConstant,
        int_op: impl Fn(i64, i64) -> Option<i64>,
        float_op: impl Fn(f64, f64) -> Option<f64>,
    ) -> Option<NumericConstant> {
        let ty = self.promoted_with(other)?;
        match ty {
            PrimitiveType::Int | PrimitiveType::Long => {
                let v = int_op(self.as_i64()?, other.as_i64()?)?;
                Some(Self::int_of(ty, v))
            }
            PrimitiveType::Float => {
                let v = float_op(self.as_f64()?, other.as_f64()?)?;
                Some(NumericConstant::Float(v as f32))
            }
            PrimitiveType::Double => {
                let v = float_op(self.as_f64()?, other.as_f64()?)?;
                Some(NumericConstant::Double(v))
            }
            PrimitiveType::Boolean => None,
        }
    }
}

/// Bitwise operator selector for constant folding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOp {
    /// Bitwise and
    And,
    /// Bitwise or
    Or,
    /// Bitwise xor
    Xor,
}
