//! Symbolic variables
//!
//! A [`NumericVariable`] is a named unknown with a declared primitive type.
//! Identity is name plus type: two variables with equal name and type are
//! the same logical unknown everywhere in the solver.

use crate::constant::PrimitiveType;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Whether an unknown ranges over integers or reals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// Integer-valued unknown
    Integer,
    /// Real-valued unknown
    Real,
}

/// Where a variable came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarOrigin {
    /// Declared by the interpreted program.
    Program,
    /// Introduced by the normalizer to linearize a cast, modulo or quotient.
    Substitution,
}

/// A named symbolic unknown with a declared primitive type.
///
/// Cloning is cheap; the name is shared. The origin flag is carried for
/// branching heuristics and display but takes no part in identity.
#[derive(Clone, Debug)]
pub struct NumericVariable {
    name: Arc<str>,
    ty: PrimitiveType,
    origin: VarOrigin,
}

impl NumericVariable {
    /// A program-declared variable.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, ty: PrimitiveType) -> Self {
        NumericVariable {
            name: name.into(),
            ty,
            origin: VarOrigin::Program,
        }
    }

    /// A substitution-introduced variable. Names generated by the
    /// substitution table use the reserved `#` prefix.
    #[must_use]
    pub fn substitution(name: impl Into<Arc<str>>, ty: PrimitiveType) -> Self {
        NumericVariable {
            name: name.into(),
            ty,
            origin: VarOrigin::Substitution,
        }
    }

    /// The variable's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared primitive type.
    #[must_use]
    pub fn ty(&self) -> PrimitiveType {
        self.ty
    }

    /// Integer-valued vs real-valued.
    #[must_use]
    pub fn kind(&self) -> NumericKind {
        self.ty.kind()
    }

    /// Whether the normalizer introduced this variable.
    #[must_use]
    pub fn is_substitution(&self) -> bool {
        self.origin == VarOrigin::Substitution
    }
}

impl PartialEq for NumericVariable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

impl Eq for NumericVariable {}

impl Hash for NumericVariable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.ty.hash(state);
    }
}

impl PartialOrd for NumericVariable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumericVariable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.ty.cmp(&other.ty))
    }
}

impl fmt::Display for NumericVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_name_and_type() {
        let a = NumericVariable::new("x", PrimitiveType::Int);
        let b = NumericVariable::new("x", PrimitiveType::Int);
        let c = NumericVariable::new("x", PrimitiveType::Double);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let s = NumericVariable::substitution("x", PrimitiveType::Int);
        assert_eq!(a, s);
        assert!(s.is_substitution());
    }

    #[test]
    fn kind_follows_type() {
        assert_eq!(
            NumericVariable::new("i", PrimitiveType::Long).kind(),
            NumericKind::Integer
        );
        assert_eq!(
            NumericVariable::new("d", PrimitiveType::Float).kind(),
            NumericKind::Real
        );
    }
}
