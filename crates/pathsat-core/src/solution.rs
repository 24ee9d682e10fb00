//! Solver solutions
//!
//! A [`Solution`] is a finite mapping from variable to typed constant,
//! produced fresh by each solver query and never mutated after return.
//! Infeasibility is not a solution value; the solver façade reports it as
//! its own outcome.

use crate::constant::NumericConstant;
use crate::variable::NumericVariable;
use num_rational::BigRational;
use std::collections::BTreeMap;
use std::fmt;

/// A finite mapping from variables to typed constants.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Solution {
    bindings: BTreeMap<NumericVariable, NumericConstant>,
}

impl Solution {
    /// An empty solution.
    #[must_use]
    pub fn new() -> Self {
        Solution::default()
    }

    /// Bind a variable. Later bindings replace earlier ones.
    pub fn bind(&mut self, var: NumericVariable, value: NumericConstant) {
        self.bindings.insert(var, value);
    }

    /// The binding for `var`, if any.
    #[must_use]
    pub fn get(&self, var: &NumericVariable) -> Option<&NumericConstant> {
        self.bindings.get(var)
    }

    /// Iterate bindings in deterministic variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&NumericVariable, &NumericConstant)> {
        self.bindings.iter()
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Exact rational view of the bindings, skipping values with no finite
    /// rational representation.
    #[must_use]
    pub fn to_rationals(&self) -> BTreeMap<NumericVariable, BigRational> {
        self.bindings
            .iter()
            .filter_map(|(v, c)| c.to_rational().map(|r| (v.clone(), r)))
            .collect()
    }
}

impl FromIterator<(NumericVariable, NumericConstant)> for Solution {
    fn from_iter<I: IntoIterator<Item = (NumericVariable, NumericConstant)>>(iter: I) -> Self {
        Solution {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (v, c)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", v, c)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::PrimitiveType;

    #[test]
    fn bindings_are_typed_and_ordered() {
        let mut sol = Solution::new();
        sol.bind(
            NumericVariable::new("b", PrimitiveType::Int),
            NumericConstant::Int(2),
        );
        sol.bind(
            NumericVariable::new("a", PrimitiveType::Double),
            NumericConstant::Double(0.5),
        );
        let names: Vec<_> = sol.iter().map(|(v, _)| v.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        let rats = sol.to_rationals();
        assert_eq!(rats.len(), 2);
    }
}
