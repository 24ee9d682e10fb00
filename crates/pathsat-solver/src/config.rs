//! Solver configuration
//!
//! All options are fixed when the solver is constructed; switching options
//! mid-session means constructing a new solver. There is no ambient or
//! global configuration.

use std::time::Duration;

/// Coefficient arithmetic backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericBackend {
    /// Exact rational arithmetic: no rounding error, higher cost.
    Exact,
    /// Double precision with a rounding-error post-solving pass.
    Float,
}

/// Which fractional integer variable branch-and-bound prefers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchPreference {
    /// First fractional variable in declaration order.
    DeclarationOrder,
    /// Substitution-introduced variables before program variables.
    SubstitutionFirst,
}

/// Construction-time solver options.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Numeric backend.
    pub backend: NumericBackend,
    /// Generate Gomory cuts before branching.
    pub gomory_cuts: bool,
    /// Branch variable preference.
    pub branch_preference: BranchPreference,
    /// Reuse tableau state across pushes instead of re-solving from
    /// scratch at every query. An optimization, never a semantic change.
    pub incremental: bool,
    /// Violations up to this threshold count as rounding error on the
    /// float backend (also its integrality tolerance). Empirically tuned;
    /// deliberately configuration, not a constant.
    pub rounding_threshold: f64,
    /// Wall-clock budget per query, checked cooperatively at pivot and
    /// branch boundaries.
    pub timeout: Option<Duration>,
    /// Pivot budget per optimization loop.
    pub max_pivots: usize,
    /// Branch node budget per query.
    pub max_nodes: usize,
    /// Cutting-plane budget per query.
    pub max_cuts: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            backend: NumericBackend::Exact,
            gomory_cuts: true,
            branch_preference: BranchPreference::DeclarationOrder,
            incremental: true,
            rounding_threshold: 1e-8,
            timeout: None,
            max_pivots: 10_000,
            max_nodes: 2_000,
            max_cuts: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_exact_and_incremental() {
        let c = SolverConfig::default();
        assert_eq!(c.backend, NumericBackend::Exact);
        assert!(c.incremental);
        assert!(c.gomory_cuts);
        assert!((c.rounding_threshold - 1e-8).abs() < 1e-20);
    }
}
