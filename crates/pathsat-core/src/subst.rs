//! Substitution table for linearized subterms
//!
//! The normalizer replaces narrowing casts, modulo and integer quotients by
//! fresh variables plus linear side constraints. The table caches those
//! substitutions by structural equality so that two path-condition
//! constraints sharing a non-linear subterm share its linearization, and it
//! carries push/pop markers aligned 1:1 with the solver's constraint stack
//! so substitutions introduced while a branch was active are forgotten on
//! backtrack.

use crate::constant::PrimitiveType;
use crate::constraint::ComposedConstraint;
use crate::error::IncorrectUseError;
use crate::term::Term;
use crate::variable::NumericVariable;
use hashbrown::HashMap;

/// One substitution: a source subterm, the fresh variable standing in for
/// it, and the side constraint relating the two.
#[derive(Clone, Debug)]
pub struct SubstEntry {
    /// The replaced subterm.
    pub source: Term,
    /// The fresh stand-in variable.
    pub variable: NumericVariable,
    /// Linear side constraint tying `variable` to `source`.
    pub side: ComposedConstraint,
}

/// Ordered, push/pop-aware cache of substitutions.
#[derive(Clone, Debug, Default)]
pub struct SubstitutionTable {
    entries: Vec<SubstEntry>,
    index: HashMap<Term, usize>,
    markers: Vec<usize>,
    counter: u64,
}

impl SubstitutionTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        SubstitutionTable::default()
    }

    /// Record a checkpoint. Must be called once per pushed constraint.
    pub fn push_marker(&mut self) {
        self.markers.push(self.entries.len());
    }

    /// Forget every substitution made since the matching
    /// [`push_marker`](Self::push_marker). The fresh-name counter is not
    /// reset, so names stay stable across backtracking.
    pub fn pop_marker(&mut self) -> Result<(), IncorrectUseError> {
        let mark = self
            .markers
            .pop()
            .ok_or(IncorrectUseError("pop_marker on an unmarked table"))?;
        for entry in self.entries.drain(mark..) {
            self.index.remove(&entry.source);
        }
        Ok(())
    }

    /// The cached substitution for a structurally equal subterm, if its
    /// scope is still live.
    #[must_use]
    pub fn lookup(&self, source: &Term) -> Option<&SubstEntry> {
        self.index.get(source).map(|&i| &self.entries[i])
    }

    /// Cache a substitution. The caller guarantees `source` is not present.
    pub fn insert(&mut self, source: Term, variable: NumericVariable, side: ComposedConstraint) {
        debug_assert!(!self.index.contains_key(&source));
        self.index.insert(source.clone(), self.entries.len());
        self.entries.push(SubstEntry {
            source,
            variable,
            side,
        });
    }

    /// A fresh substitution variable. Names use the reserved `#` prefix and
    /// a table-monotonic counter.
    pub fn fresh_var(&mut self, prefix: &str, ty: PrimitiveType) -> NumericVariable {
        let name = format!("#{}{}", prefix, self.counter);
        self.counter += 1;
        NumericVariable::substitution(name, ty)
    }

    /// Number of live substitutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no substitution is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current marker depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.markers.len()
    }

    /// Live substitutions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SubstEntry> {
        self.entries.iter()
    }

    /// Drop all substitutions, markers and the name counter.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.markers.clear();
        self.counter = 0;
    }
}
