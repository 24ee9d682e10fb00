//! pathsat-lia - Mixed-integer layer over the LRA relaxation
//!
//! Solves the relaxation with the simplex engine, then forces integer-kind
//! variables to integral values:
//!
//! 1. If the relaxation is infeasible, the integer problem is infeasible.
//! 2. If every integer variable is integral (within the backend tolerance),
//!    the relaxation vertex is accepted.
//! 3. Otherwise one fractional integer variable is picked (declaration
//!    order; optionally preferring substitution-introduced variables) and
//!    either a Gomory mixed-integer cut derived from its tableau row is
//!    added and the relaxation re-solved without branching, or the search
//!    branches on `x ≤ ⌊v⌋` / `x ≥ ⌈v⌉` depth-first.
//!
//! Both cuts and branch bounds go through the tableau's checkpoint/restore
//! discipline, so failed branches leave no residual state. Node and cut
//! budgets bound the search: gcd-infeasible families such as
//! `3a − 3b ≥ 1 ∧ 3a − 3b ≤ 2` over integers make naive cut generation loop
//! forever, so budget exhaustion surfaces as a dedicated gave-up outcome
//! rather than nontermination.

#![warn(missing_docs)]
#![warn(clippy::all)]

use log::debug;
use pathsat_core::scalar::{pivot_sign, Scalar};
use pathsat_core::{Relation, SingleConstraint};
use pathsat_lra::{Checkpoint, LpModel, LpOutcome, Simplex, SolveBudget, VarId, VarTable};
use std::time::Instant;

/// Construction-time options of the integer layer.
#[derive(Clone, Debug)]
pub struct MilpOptions<S> {
    /// Try Gomory cuts before branching.
    pub gomory_cuts: bool,
    /// Prefer branching on substitution-introduced variables.
    pub prefer_substitution_vars: bool,
    /// Branch node budget per check.
    pub max_nodes: usize,
    /// Cut budget per check.
    pub max_cuts: usize,
    /// Integrality tolerance (zero for the exact backend).
    pub int_tol: S,
}

impl<S: Scalar> Default for MilpOptions<S> {
    fn default() -> Self {
        MilpOptions {
            gomory_cuts: true,
            prefer_substitution_vars: false,
            max_nodes: 2000,
            max_cuts: 64,
            int_tol: S::zero(),
        }
    }
}

/// Outcome of an integer feasibility check.
#[derive(Clone, Debug)]
pub enum MilpOutcome<S> {
    /// An integral vertex of the relaxation.
    Feasible(LpModel<S>),
    /// No integer point satisfies the constraints.
    Infeasible,
    /// The wall-clock budget ran out.
    TimedOut,
    /// A node, cut or pivot budget stopped the search before a decision.
    GaveUp(&'static str),
}

/// Search counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MilpStats {
    /// Branch nodes explored.
    pub nodes: u64,
    /// Cutting planes added.
    pub cuts: u64,
}

struct Pending<S> {
    checkpoint: Checkpoint<S>,
    var: VarId,
    ceil: S,
}

enum Alternative<S> {
    Taken,
    Exhausted,
    Stopped(MilpOutcome<S>),
}

/// Mixed-integer solver: a simplex relaxation plus branch-and-bound state.
#[derive(Clone, Debug)]
pub struct MilpSolver<S> {
    /// The underlying LP relaxation.
    pub lp: Simplex<S>,
    opts: MilpOptions<S>,
    stats: MilpStats,
}

impl<S: Scalar> MilpSolver<S> {
    /// A solver with no constraints.
    #[must_use]
    pub fn new(opts: MilpOptions<S>) -> Self {
        MilpSolver {
            lp: Simplex::new(),
            opts,
            stats: MilpStats::default(),
        }
    }

    /// The configured options.
    #[must_use]
    pub fn options(&self) -> &MilpOptions<S> {
        &self.opts
    }

    /// Search counters so far.
    #[must_use]
    pub fn stats(&self) -> MilpStats {
        self.stats
    }

    /// Lower a linear constraint into the relaxation, interning its
    /// variables, and re-establish feasibility incrementally.
    pub fn assert_constraint(
        &mut self,
        constraint: &SingleConstraint,
        vars: &mut VarTable,
        budget: &SolveBudget,
    ) -> LpOutcome {
        let p = constraint.polynomial();
        let coeffs: Vec<(VarId, S)> = p
            .iter()
            .map(|(v, q)| (vars.intern(v), S::from_rational(q)))
            .collect();
        let rhs = S::from_rational(&-p.constant_part().clone());
        self.lp.add_constraint(&coeffs, constraint.relation(), rhs, budget)
    }

    /// Round `v` to an integer if it is within the integrality tolerance.
    fn rounded_if_integral(&self, v: &S) -> Option<S> {
        let floor = v.floor();
        let frac = v.clone() - floor.clone();
        if frac <= self.opts.int_tol {
            return Some(floor);
        }
        let up = floor + S::one();
        if up.clone() - v.clone() <= self.opts.int_tol {
            return Some(up);
        }
        None
    }

    fn first_fractional<'a>(
        &self,
        model: &LpModel<S>,
        ids: impl Iterator<Item = &'a VarId>,
    ) -> Option<(VarId, S)> {
        for id in ids {
            let Some(v) = model.value(*id) else { continue };
            if self.rounded_if_integral(v).is_none() {
                return Some((*id, v.clone()));
            }
        }
        None
    }

    /// Pick the fractional integer variable to resolve next: first in
    /// declaration order, with substitution-introduced variables first when
    /// configured.
    fn select_fractional(&self, model: &LpModel<S>, vars: &VarTable) -> Option<(VarId, S)> {
        let ints = vars.integer_vars();
        if self.opts.prefer_substitution_vars {
            self.first_fractional(
                model,
                ints.iter().filter(|id| vars.var(**id).is_substitution()),
            )
            .or_else(|| {
                self.first_fractional(
                    model,
                    ints.iter().filter(|id| !vars.var(**id).is_substitution()),
                )
            })
        } else {
            self.first_fractional(model, ints.iter())
        }
    }

    /// Decide integer feasibility of the current relaxation. The tableau is
    /// restored to its pre-check state afterwards, whatever happens.
    pub fn check(&mut self, vars: &VarTable, budget: &SolveBudget) -> MilpOutcome<S> {
        let base = self.lp.checkpoint();
        let out = self.search(vars, budget);
        self.lp.restore(&base);
        out
    }

    fn search(&mut self, vars: &VarTable, budget: &SolveBudget) -> MilpOutcome<S> {
        let mut pending: Vec<Pending<S>> = Vec::new();
        let mut nodes = 0u64;
        let mut cuts = 0u64;

        let out = 'outer: loop {
            if let Some(deadline) = budget.deadline {
                if Instant::now() >= deadline {
                    break MilpOutcome::TimedOut;
                }
            }

            let model = self.lp.model();
            let Some((var, value)) = self.select_fractional(&model, vars) else {
                break MilpOutcome::Feasible(model);
            };

            if self.opts.gomory_cuts && (cuts as usize) < self.opts.max_cuts {
                if let Some((cut, bound)) = self.gomory_cut(var) {
                    cuts += 1;
                    debug!(
                        target: "pathsat::lia",
                        "gomory cut #{} from fractional {:?}", cuts, var
                    );
                    match self.lp.add_cut(&cut, bound, budget) {
                        LpOutcome::Feasible => continue 'outer,
                        LpOutcome::Infeasible => {
                            match self.take_alternative(&mut pending, &mut nodes, budget) {
                                Alternative::Taken => continue 'outer,
                                Alternative::Exhausted => break MilpOutcome::Infeasible,
                                Alternative::Stopped(o) => break o,
                            }
                        }
                        LpOutcome::TimedOut => break MilpOutcome::TimedOut,
                        LpOutcome::Aborted(_) => break MilpOutcome::GaveUp("pivot budget"),
                    }
                }
            }

            if nodes as usize >= self.opts.max_nodes {
                break MilpOutcome::GaveUp("node budget");
            }
            nodes += 1;
            let floor = value.floor();
            let ceil = floor.clone() + S::one();
            debug!(
                target: "pathsat::lia",
                "branch node {}: {:?} <= {} | >= {}", nodes, var, floor, ceil
            );
            pending.push(Pending {
                checkpoint: self.lp.checkpoint(),
                var,
                ceil,
            });
            match self
                .lp
                .add_constraint(&[(var, S::one())], Relation::Le, floor, budget)
            {
                LpOutcome::Feasible => continue 'outer,
                LpOutcome::Infeasible => {
                    match self.take_alternative(&mut pending, &mut nodes, budget) {
                        Alternative::Taken => continue 'outer,
                        Alternative::Exhausted => break MilpOutcome::Infeasible,
                        Alternative::Stopped(o) => break o,
                    }
                }
                LpOutcome::TimedOut => break MilpOutcome::TimedOut,
                LpOutcome::Aborted(_) => break MilpOutcome::GaveUp("pivot budget"),
            }
        };

        self.stats.nodes += nodes;
        self.stats.cuts += cuts;
        out
    }

    /// Backtrack: restore the deepest pending node and take its right
    /// branch (`x ≥ ⌈v⌉`), skipping branches that are immediately
    /// infeasible.
    fn take_alternative(
        &mut self,
        pending: &mut Vec<Pending<S>>,
        nodes: &mut u64,
        budget: &SolveBudget,
    ) -> Alternative<S> {
        loop {
            let Some(p) = pending.pop() else {
                return Alternative::Exhausted;
            };
            if *nodes as usize >= self.opts.max_nodes {
                return Alternative::Stopped(MilpOutcome::GaveUp("node budget"));
            }
            *nodes += 1;
            self.lp.restore(&p.checkpoint);
            // x >= ceil  as  -x <= -ceil.
            match self.lp.add_constraint(
                &[(p.var, -S::one())],
                Relation::Le,
                -p.ceil.clone(),
                budget,
            ) {
                LpOutcome::Feasible => return Alternative::Taken,
                LpOutcome::Infeasible => continue,
                LpOutcome::TimedOut => return Alternative::Stopped(MilpOutcome::TimedOut),
                LpOutcome::Aborted(_) => {
                    return Alternative::Stopped(MilpOutcome::GaveUp("pivot budget"))
                }
            }
        }
    }

    /// A Gomory mixed-integer cut from the tableau row of `var`.
    ///
    /// With the row `x = b + Σ gⱼ·xⱼ` over nonnegative nonbasic columns and
    /// `x` integer, every integer-feasible point satisfies
    /// `Σ_{g>0} g/(1−f₀)·xⱼ + Σ_{g<0} (−g)/f₀·xⱼ ≥ 1` for `f₀ = b − ⌊b⌋`.
    /// The current vertex (all nonbasics at zero) violates it, so adding
    /// the cut makes progress without excluding any integer point.
    fn gomory_cut(&self, var: VarId) -> Option<(Vec<(usize, S)>, S)> {
        let (rhs, row) = self.lp.variable_row(var)?;
        if !rhs.eps.is_pivot_zero() {
            // Infinitesimal residue: leave this one to branching.
            return None;
        }
        let b = rhs.real;
        let f0 = b.clone() - b.floor();
        if f0.is_pivot_zero() {
            return None;
        }
        let one_minus = S::one() - f0.clone();
        if one_minus.is_pivot_zero() {
            return None;
        }
        let mut cut = Vec::with_capacity(row.len());
        for (col, g) in row {
            match pivot_sign(&g) {
                1 => cut.push((col, g / one_minus.clone())),
                -1 => cut.push((col, -g / f0.clone())),
                _ => {}
            }
        }
        if cut.is_empty() {
            return None;
        }
        Some((cut, S::one()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;
    use pathsat_core::{NumericVariable, Polynomial, PrimitiveType};

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    fn ivar(name: &str) -> NumericVariable {
        NumericVariable::new(name, PrimitiveType::Int)
    }

    /// `Σ coeff·var + c ⋈ 0`
    fn constraint(terms: &[(&NumericVariable, i64)], c: i64, rel: Relation) -> SingleConstraint {
        let mut p = Polynomial::constant(rat(c));
        for (v, k) in terms {
            p.add_term((*v).clone(), rat(*k));
        }
        SingleConstraint::new(p, rel)
    }

    fn unlimited() -> SolveBudget {
        SolveBudget::unlimited()
    }

    fn assert_all(
        solver: &mut MilpSolver<BigRational>,
        vars: &mut VarTable,
        cs: &[SingleConstraint],
    ) {
        for c in cs {
            assert_eq!(
                solver.assert_constraint(c, vars, &unlimited()),
                LpOutcome::Feasible
            );
        }
    }

    #[test]
    fn integral_vertex_is_accepted_directly() {
        // 2a + b + 1 <= 4, a + b >= 3.
        let a = ivar("a");
        let b = ivar("b");
        let mut vars = VarTable::new();
        let mut solver = MilpSolver::new(MilpOptions::default());
        assert_all(
            &mut solver,
            &mut vars,
            &[
                constraint(&[(&a, 2), (&b, 1)], -3, Relation::Le),
                constraint(&[(&a, -1), (&b, -1)], 3, Relation::Le),
            ],
        );
        let MilpOutcome::Feasible(model) = solver.check(&vars, &unlimited()) else {
            panic!("expected a feasible integral model");
        };
        let av = model.value(vars.get(&a).unwrap()).unwrap().clone();
        let bv = model.value(vars.get(&b).unwrap()).unwrap().clone();
        assert!(av.is_integer() && bv.is_integer());
        assert!(rat(2) * av.clone() + bv.clone() <= rat(3));
        assert!(av + bv >= rat(3));
    }

    #[test]
    fn branching_resolves_fractional_relaxations() {
        // 2x >= 1, 2x <= 3 has the relaxation vertex x = 1/2; x = 1 is the
        // only integer point.
        let x = ivar("x");
        let mut vars = VarTable::new();
        let mut solver = MilpSolver::new(MilpOptions {
            gomory_cuts: false,
            ..MilpOptions::default()
        });
        assert_all(
            &mut solver,
            &mut vars,
            &[
                constraint(&[(&x, -2)], 1, Relation::Le),
                constraint(&[(&x, 2)], -3, Relation::Le),
            ],
        );
        let MilpOutcome::Feasible(model) = solver.check(&vars, &unlimited()) else {
            panic!("expected x = 1");
        };
        assert_eq!(model.value(vars.get(&x).unwrap()), Some(&rat(1)));
        assert!(solver.stats().nodes > 0);
    }

    #[test]
    fn cuts_resolve_fractional_relaxations_too() {
        let x = ivar("x");
        let mut vars = VarTable::new();
        let mut solver = MilpSolver::new(MilpOptions::default());
        assert_all(
            &mut solver,
            &mut vars,
            &[
                constraint(&[(&x, -2)], 1, Relation::Le),
                constraint(&[(&x, 2)], -3, Relation::Le),
            ],
        );
        let MilpOutcome::Feasible(model) = solver.check(&vars, &unlimited()) else {
            panic!("expected x = 1");
        };
        assert_eq!(model.value(vars.get(&x).unwrap()), Some(&rat(1)));
    }

    #[test]
    fn empty_integer_interval_is_infeasible() {
        // 1 <= 3x <= 2 has no integer solution.
        let x = ivar("x");
        let mut vars = VarTable::new();
        let mut solver = MilpSolver::new(MilpOptions {
            gomory_cuts: false,
            ..MilpOptions::default()
        });
        assert_all(
            &mut solver,
            &mut vars,
            &[
                constraint(&[(&x, -3)], 1, Relation::Le),
                constraint(&[(&x, 3)], -2, Relation::Le),
            ],
        );
        assert!(matches!(
            solver.check(&vars, &unlimited()),
            MilpOutcome::Infeasible
        ));
    }

    #[test]
    fn gcd_infeasible_family_terminates_within_budget() {
        // 3a - 3b >= 1, 3a - 3b <= 2: infeasible over integers because 3
        // divides neither bound, and a known driver of endless cut/branch
        // loops. The budgets must end the search either way.
        let a = ivar("a");
        let b = ivar("b");
        let mut vars = VarTable::new();
        let mut solver = MilpSolver::new(MilpOptions {
            max_nodes: 64,
            max_cuts: 16,
            ..MilpOptions::default()
        });
        assert_all(
            &mut solver,
            &mut vars,
            &[
                constraint(&[(&a, -3), (&b, 3)], 1, Relation::Le),
                constraint(&[(&a, 3), (&b, -3)], -2, Relation::Le),
            ],
        );
        let out = solver.check(&vars, &unlimited());
        assert!(matches!(
            out,
            MilpOutcome::Infeasible | MilpOutcome::GaveUp(_)
        ));
    }

    #[test]
    fn check_restores_the_relaxation() {
        let x = ivar("x");
        let mut vars = VarTable::new();
        let mut solver = MilpSolver::new(MilpOptions::default());
        assert_all(
            &mut solver,
            &mut vars,
            &[
                constraint(&[(&x, -2)], 1, Relation::Le),
                constraint(&[(&x, 2)], -3, Relation::Le),
            ],
        );
        let before = solver.lp.stats().rows;
        let _ = solver.check(&vars, &unlimited());
        assert_eq!(solver.lp.stats().rows, before);
    }

    #[test]
    fn substitution_preference_changes_branch_order() {
        let x = ivar("x");
        let s = NumericVariable::substitution("#q0", PrimitiveType::Int);
        let mut vars = VarTable::new();
        let mut solver = MilpSolver::new(MilpOptions {
            gomory_cuts: false,
            prefer_substitution_vars: true,
            ..MilpOptions::default()
        });
        // Both x and #q0 land on 1/2: 2x >= 1, 2x <= 1 is x = 1/2 (via Eq),
        // same for #q0; the solver must still decide infeasibility.
        assert_all(
            &mut solver,
            &mut vars,
            &[
                constraint(&[(&x, 2)], -1, Relation::Eq),
                constraint(&[(&s, 2)], -1, Relation::Eq),
            ],
        );
        assert!(matches!(
            solver.check(&vars, &unlimited()),
            MilpOutcome::Infeasible
        ));
    }
}
