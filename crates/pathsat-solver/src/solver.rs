//! The incremental solver facade
//!
//! The interpreter pushes one constraint when entering a branch and pops it
//! when backtracking; pushes and pops nest strictly LIFO. Internally the
//! facade keeps, per pushed constraint, a substitution-table marker and
//! (in incremental mode) a tableau checkpoint, so a pop restores solver
//! state to exactly what it was before the matching push.
//!
//! Queries are cached until the stack changes. Disjunctive constraints are
//! resolved by a depth-first search over one system per stacked
//! constraint; stacks of single-system constraints reuse the incremental
//! tableau directly. In from-scratch mode every query replays the net
//! stack in push order, which makes the two modes produce identical
//! solutions.

use crate::config::{BranchPreference, NumericBackend, SolverConfig};
use crate::error::SolverError;
use crate::outcome::{Feasibility, SolveOutcome, UnknownReason};
use log::debug;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use pathsat_core::scalar::{Approx, Scalar};
use pathsat_core::{
    composed_satisfied, normalize, ComposedConstraint, ConstraintExpression, ConstraintStack,
    NumericConstant, NumericKind, NumericVariable, Solution, SubstitutionTable,
};
use pathsat_lia::{MilpOptions, MilpOutcome, MilpSolver};
use pathsat_lra::{Checkpoint, LpModel, LpOutcome, SolveBudget, VarTable};
use std::collections::BTreeMap;
use std::time::Instant;

/// An incremental satisfiability solver over linear path-condition
/// constraints. One instance serves one symbolic execution path; instances
/// are not shared across threads.
pub struct IncrementalSolver {
    engine: Engine,
}

enum Engine {
    Exact(Context<BigRational>),
    Float(Context<Approx>),
}

macro_rules! with_context {
    ($self:expr, $ctx:ident => $body:expr) => {
        match &mut $self.engine {
            Engine::Exact($ctx) => $body,
            Engine::Float($ctx) => $body,
        }
    };
}

macro_rules! with_context_ref {
    ($self:expr, $ctx:ident => $body:expr) => {
        match &$self.engine {
            Engine::Exact($ctx) => $body,
            Engine::Float($ctx) => $body,
        }
    };
}

impl IncrementalSolver {
    /// Construct a solver with the given immutable configuration.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        let engine = match config.backend {
            NumericBackend::Exact => Engine::Exact(Context::new(config)),
            NumericBackend::Float => Engine::Float(Context::new(config)),
        };
        IncrementalSolver { engine }
    }

    /// A solver with default (exact, incremental) configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// The configuration this solver was constructed with.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        with_context_ref!(self, ctx => &ctx.config)
    }

    /// Normalize a constraint expression and push it. On error nothing is
    /// pushed and solver state is unchanged.
    pub fn add_constraint(&mut self, expr: &ConstraintExpression) -> Result<(), SolverError> {
        with_context!(self, ctx => ctx.push_expr(expr))
    }

    /// Push an already-normalized constraint.
    pub fn add_composed(&mut self, constraint: ComposedConstraint) {
        with_context!(self, ctx => ctx.push_composed(constraint));
    }

    /// Pop the most recently added constraint and its substitutions,
    /// restoring solver state to before the matching push. Popping an
    /// empty stack is a usage error.
    pub fn remove_constraint(&mut self) -> Result<(), SolverError> {
        with_context!(self, ctx => ctx.pop())
    }

    /// Solve the current stack. Returns the cached outcome when the stack
    /// is unchanged since the last query.
    pub fn solution(&mut self) -> SolveOutcome {
        with_context!(self, ctx => ctx.solution())
    }

    /// Feasibility-only query; shares the outcome cache with
    /// [`solution`](Self::solution).
    pub fn is_satisfiable(&mut self) -> Feasibility {
        with_context!(self, ctx => ctx.solution().feasibility())
    }

    /// Return to the empty-constraint-set state.
    pub fn reset(&mut self) {
        with_context!(self, ctx => ctx.reset());
    }

    /// Number of constraints currently stacked.
    #[must_use]
    pub fn depth(&self) -> usize {
        with_context_ref!(self, ctx => ctx.stack.len())
    }

    /// Number of live substitutions in the table.
    #[must_use]
    pub fn substitution_count(&self) -> usize {
        with_context_ref!(self, ctx => ctx.table.len())
    }
}

struct Context<S: Scalar> {
    config: SolverConfig,
    vars: VarTable,
    table: SubstitutionTable,
    stack: ConstraintStack,
    milp: MilpSolver<S>,
    /// One entry per stacked constraint; `Some` only for constraints
    /// materialized into the incremental tableau.
    checkpoints: Vec<Option<Checkpoint<S>>>,
    /// Length of the stack prefix represented by `milp.lp`.
    materialized: usize,
    /// Depth at which an incremental push proved the prefix infeasible.
    infeasible_at: Option<usize>,
    cache: Option<SolveOutcome>,
}

impl<S: Scalar> Context<S> {
    fn new(config: SolverConfig) -> Self {
        let milp = MilpSolver::new(Self::milp_options(&config));
        Context {
            config,
            vars: VarTable::new(),
            table: SubstitutionTable::new(),
            stack: ConstraintStack::new(),
            milp,
            checkpoints: Vec::new(),
            materialized: 0,
            infeasible_at: None,
            cache: None,
        }
    }

    fn milp_options(config: &SolverConfig) -> MilpOptions<S> {
        MilpOptions {
            gomory_cuts: config.gomory_cuts,
            prefer_substitution_vars: matches!(
                config.branch_preference,
                BranchPreference::SubstitutionFirst
            ),
            max_nodes: config.max_nodes,
            max_cuts: config.max_cuts,
            int_tol: if S::EXACT {
                S::zero()
            } else {
                S::from_rational(
                    &BigRational::from_float(config.rounding_threshold)
                        .unwrap_or_else(BigRational::zero),
                )
            },
        }
    }

    fn push_budget(&self) -> SolveBudget {
        SolveBudget {
            deadline: None,
            max_pivots: self.config.max_pivots,
        }
    }

    fn solve_budget(&self) -> SolveBudget {
        SolveBudget {
            deadline: self.config.timeout.map(|t| Instant::now() + t),
            max_pivots: self.config.max_pivots,
        }
    }

    fn push_expr(&mut self, expr: &ConstraintExpression) -> Result<(), SolverError> {
        self.table.push_marker();
        match normalize(expr, &mut self.table) {
            Ok(composed) => {
                self.push_composed_inner(composed);
                Ok(())
            }
            Err(e) => {
                // Roll back substitutions from the failed normalization.
                let _ = self.table.pop_marker();
                Err(e.into())
            }
        }
    }

    fn push_composed(&mut self, composed: ComposedConstraint) {
        self.table.push_marker();
        self.push_composed_inner(composed);
    }

    fn push_composed_inner(&mut self, composed: ComposedConstraint) {
        self.cache = None;
        let depth = self.stack.len();
        debug!(
            target: "pathsat::solver",
            "push depth {}: {} system(s)", depth, composed.systems().len()
        );

        if composed.is_unsatisfiable() {
            if self.infeasible_at.is_none() {
                self.infeasible_at = Some(depth);
            }
            self.checkpoints.push(None);
            self.stack.push(composed);
            return;
        }

        let incremental_ok = self.config.incremental
            && self.infeasible_at.is_none()
            && self.materialized == depth
            && composed.systems().len() == 1;
        if incremental_ok {
            let cp = self.milp.lp.checkpoint();
            let budget = self.push_budget();
            let mut outcome = LpOutcome::Feasible;
            for c in composed.systems()[0].constraints() {
                outcome = self.milp.assert_constraint(c, &mut self.vars, &budget);
                if outcome != LpOutcome::Feasible {
                    break;
                }
            }
            match outcome {
                LpOutcome::Feasible => {
                    self.checkpoints.push(Some(cp));
                    self.materialized = depth + 1;
                }
                LpOutcome::Infeasible => {
                    self.milp.lp.restore(&cp);
                    self.infeasible_at = Some(depth);
                    self.checkpoints.push(None);
                }
                LpOutcome::TimedOut | LpOutcome::Aborted(_) => {
                    // Leave this push unmaterialized; queries fall back to
                    // the replay search.
                    self.milp.lp.restore(&cp);
                    self.checkpoints.push(None);
                }
            }
        } else {
            self.checkpoints.push(None);
        }
        self.stack.push(composed);
    }

    fn pop(&mut self) -> Result<(), SolverError> {
        self.stack.pop().map_err(SolverError::from)?;
        let depth = self.stack.len();
        if let Some(Some(cp)) = self.checkpoints.pop() {
            self.milp.lp.restore(&cp);
            self.materialized = depth;
        }
        if self.infeasible_at == Some(depth) {
            self.infeasible_at = None;
        }
        self.table.pop_marker()?;
        self.cache = None;
        debug!(target: "pathsat::solver", "pop to depth {}", depth);
        Ok(())
    }

    fn reset(&mut self) {
        let config = self.config.clone();
        *self = Context::new(config);
    }

    fn solution(&mut self) -> SolveOutcome {
        if let Some(cached) = &self.cache {
            return cached.clone();
        }
        let out = self.solve();
        self.cache = Some(out.clone());
        out
    }

    fn solve(&mut self) -> SolveOutcome {
        if self.infeasible_at.is_some() {
            return SolveOutcome::Infeasible;
        }
        let budget = self.solve_budget();
        let milp_out = if self.config.incremental && self.materialized == self.stack.len() {
            self.milp.check(&self.vars, &budget)
        } else {
            let mut fresh = MilpSolver::new(self.milp.options().clone());
            search_systems(
                self.stack.entries(),
                0,
                &mut fresh,
                &mut self.vars,
                &budget,
            )
        };
        match milp_out {
            MilpOutcome::Feasible(model) => self.finalize(&model),
            MilpOutcome::Infeasible => SolveOutcome::Infeasible,
            MilpOutcome::TimedOut => SolveOutcome::TimedOut,
            MilpOutcome::GaveUp(what) => SolveOutcome::Unknown(UnknownReason::Budget(what)),
        }
    }

    /// Turn an LP model into a typed solution. On the float backend this is
    /// the rounding-error post-solving pass: integer-kind values are
    /// snapped within the threshold and every stacked constraint is
    /// re-validated; anything beyond the threshold is reported as
    /// undecided, never silently accepted.
    fn finalize(&self, model: &LpModel<S>) -> SolveOutcome {
        let threshold = BigRational::from_float(self.config.rounding_threshold)
            .unwrap_or_else(BigRational::zero);
        let mut rationals: BTreeMap<NumericVariable, BigRational> = BTreeMap::new();
        for (id, value) in model.iter() {
            let var = self.vars.var(*id).clone();
            let mut r = value.to_rational();
            if !S::EXACT && var.kind() == NumericKind::Integer {
                let snapped = r.round();
                if Signed::abs(&(&r - &snapped)) <= threshold {
                    r = snapped;
                }
            }
            rationals.insert(var, r);
        }

        if !S::EXACT {
            for entry in self.stack.entries() {
                if !composed_satisfied(entry, &rationals, &threshold) {
                    debug!(
                        target: "pathsat::solver",
                        "post-solving rejected a candidate beyond threshold"
                    );
                    return SolveOutcome::Unknown(UnknownReason::Numerics);
                }
            }
        }

        let mut solution = Solution::new();
        for (var, r) in rationals {
            let value = NumericConstant::from_rational(var.ty(), &r);
            solution.bind(var, value);
        }
        SolveOutcome::Feasible(solution)
    }
}

/// Depth-first search over one system per stacked constraint, replaying
/// constraints in push order on a transient solver.
fn search_systems<S: Scalar>(
    entries: &[ComposedConstraint],
    depth: usize,
    milp: &mut MilpSolver<S>,
    vars: &mut VarTable,
    budget: &SolveBudget,
) -> MilpOutcome<S> {
    if depth == entries.len() {
        return milp.check(vars, budget);
    }
    for system in entries[depth].systems() {
        let cp = milp.lp.checkpoint();
        let mut viable = true;
        for c in system.constraints() {
            match milp.assert_constraint(c, vars, budget) {
                LpOutcome::Feasible => {}
                LpOutcome::Infeasible => {
                    viable = false;
                    break;
                }
                LpOutcome::TimedOut => return MilpOutcome::TimedOut,
                LpOutcome::Aborted(_) => return MilpOutcome::GaveUp("pivot budget"),
            }
        }
        if viable {
            match search_systems(entries, depth + 1, milp, vars, budget) {
                MilpOutcome::Infeasible => {}
                out => return out,
            }
        }
        milp.lp.restore(&cp);
    }
    MilpOutcome::Infeasible
}
