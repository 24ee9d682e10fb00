//! Two-phase simplex tableau
//!
//! The tableau keeps one row per installed constraint (after slack and
//! artificial variables) and one column per nonnegative solver variable.
//! Rows are fully reduced: each row's basic column is a unit column across
//! the tableau, every nonbasic column sits at zero, and every right-hand
//! side is lexicographically nonnegative, so the tableau always encodes a
//! basic feasible solution.
//!
//! Installing a row substitutes the current basis into it, then either
//! makes the slack basic (already-satisfied row) or adds an artificial
//! variable and minimizes it: a bounded Phase 1 whose nonzero minimum
//! proves infeasibility. Pivoting follows Bland's rule, which cannot
//! cycle.

use crate::delta::Delta;
use crate::vars::VarId;
use hashbrown::HashMap;
use log::trace;
use pathsat_core::scalar::{pivot_sign, Scalar};
use pathsat_core::Relation;
use std::cmp::Ordering;
use std::time::Instant;

/// What a solver variable's column stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColKind {
    /// Positive half of a split free variable.
    StructPos(VarId),
    /// Negative half of a split free variable.
    StructNeg(VarId),
    /// Slack of an inequality row.
    Slack,
    /// Phase-1 artificial.
    Artificial,
}

#[derive(Clone, Debug)]
struct Column {
    kind: ColKind,
    /// Dead columns (retired artificials) never enter the basis again.
    dead: bool,
}

#[derive(Clone, Debug)]
struct Row<S> {
    coeffs: Vec<S>,
    rhs: Delta<S>,
    basic: usize,
}

/// Cooperative resource budget for one solving step.
#[derive(Clone, Copy, Debug)]
pub struct SolveBudget {
    /// Wall-clock deadline checked at pivot boundaries.
    pub deadline: Option<Instant>,
    /// Pivot cap per optimization loop.
    pub max_pivots: usize,
}

impl SolveBudget {
    /// No deadline, effectively unbounded pivots.
    #[must_use]
    pub fn unlimited() -> Self {
        SolveBudget {
            deadline: None,
            max_pivots: usize::MAX,
        }
    }
}

/// Outcome of installing or re-solving rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LpOutcome {
    /// The tableau encodes a feasible vertex.
    Feasible,
    /// The constraint set is infeasible.
    Infeasible,
    /// The wall-clock budget ran out mid-pivot.
    TimedOut,
    /// A proactive resource limit stopped the solve.
    Aborted(&'static str),
}

/// Counters exposed for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LpStats {
    /// Total pivots performed by this tableau.
    pub pivots: u64,
    /// Live rows.
    pub rows: usize,
    /// Columns ever created (including retired artificials).
    pub cols: usize,
}

/// A feasible vertex: one value per structural variable, together with the
/// concrete infinitesimal used to realize strict bounds.
#[derive(Clone, Debug)]
pub struct LpModel<S> {
    values: HashMap<VarId, S>,
    /// The concrete δ > 0 substituted for the infinitesimal.
    pub delta: S,
}

impl<S: Scalar> LpModel<S> {
    /// The value of a variable, if it has tableau columns.
    #[must_use]
    pub fn value(&self, v: VarId) -> Option<&S> {
        self.values.get(&v)
    }

    /// Iterate all variable values.
    pub fn iter(&self) -> impl Iterator<Item = (&VarId, &S)> {
        self.values.iter()
    }
}

/// Whole-tableau snapshot for exact backtracking.
#[derive(Clone, Debug)]
pub struct Checkpoint<S>(Simplex<S>);

enum OptResult<S> {
    Optimal(Delta<S>),
    Unbounded,
    TimedOut,
    PivotLimit,
}

/// The simplex tableau.
#[derive(Clone, Debug)]
pub struct Simplex<S> {
    cols: Vec<Column>,
    rows: Vec<Row<S>>,
    /// Column -> row it is basic in.
    col_basic: Vec<Option<usize>>,
    /// VarId -> (positive, negative) column pair.
    var_cols: Vec<Option<(usize, usize)>>,
    pivots: u64,
}

impl<S: Scalar> Default for Simplex<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar> Simplex<S> {
    /// An empty tableau.
    #[must_use]
    pub fn new() -> Self {
        Simplex {
            cols: Vec::new(),
            rows: Vec::new(),
            col_basic: Vec::new(),
            var_cols: Vec::new(),
            pivots: 0,
        }
    }

    /// Counters for diagnostics.
    #[must_use]
    pub fn stats(&self) -> LpStats {
        LpStats {
            pivots: self.pivots,
            rows: self.rows.len(),
            cols: self.cols.len(),
        }
    }

    /// Snapshot the whole tableau.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint<S> {
        Checkpoint(self.clone())
    }

    /// Restore a snapshot exactly.
    pub fn restore(&mut self, cp: &Checkpoint<S>) {
        *self = cp.0.clone();
    }

    fn new_col(&mut self, kind: ColKind) -> usize {
        let idx = self.cols.len();
        self.cols.push(Column { kind, dead: false });
        self.col_basic.push(None);
        for row in &mut self.rows {
            row.coeffs.push(S::zero());
        }
        idx
    }

    fn ensure_var(&mut self, v: VarId) -> (usize, usize) {
        let i = v.0 as usize;
        if i >= self.var_cols.len() {
            self.var_cols.resize(i + 1, None);
        }
        if let Some(pair) = self.var_cols[i] {
            return pair;
        }
        let pos = self.new_col(ColKind::StructPos(v));
        let neg = self.new_col(ColKind::StructNeg(v));
        self.var_cols[i] = Some((pos, neg));
        (pos, neg)
    }

    /// Install `Σ coeff·var ⋈ rhs` and re-establish feasibility
    /// incrementally. On anything but [`LpOutcome::Feasible`] the tableau
    /// is left for the caller to restore from a checkpoint.
    pub fn add_constraint(
        &mut self,
        coeffs: &[(VarId, S)],
        relation: Relation,
        rhs: S,
        budget: &SolveBudget,
    ) -> LpOutcome {
        let pairs: Vec<((usize, usize), S)> = coeffs
            .iter()
            .map(|(v, a)| (self.ensure_var(*v), a.clone()))
            .collect();
        let mut acc = vec![S::zero(); self.cols.len()];
        for ((pos, neg), a) in pairs {
            acc[pos] = acc[pos].clone() + a.clone();
            acc[neg] = acc[neg].clone() - a;
        }
        let rhs = match relation {
            Relation::Lt => Delta::strict(rhs),
            _ => Delta::from_real(rhs),
        };
        self.install_row(acc, rhs, relation == Relation::Eq, budget)
    }

    /// Install a cutting plane `Σ coeff·col ≥ rhs` phrased directly over
    /// tableau columns (used by the Gomory layer).
    pub fn add_cut(&mut self, coeffs: &[(usize, S)], rhs: S, budget: &SolveBudget) -> LpOutcome {
        let mut acc = vec![S::zero(); self.cols.len()];
        for (col, c) in coeffs {
            acc[*col] = acc[*col].clone() - c.clone();
        }
        self.install_row(acc, Delta::from_real(-rhs), false, budget)
    }

    fn install_row(
        &mut self,
        mut acc: Vec<S>,
        mut rhs: Delta<S>,
        is_eq: bool,
        budget: &SolveBudget,
    ) -> LpOutcome {
        // Express the new row over the current nonbasic columns.
        for j in 0..acc.len() {
            if acc[j].is_pivot_zero() {
                continue;
            }
            let Some(r) = self.col_basic[j] else { continue };
            let factor = acc[j].clone();
            rhs = rhs - self.rows[r].rhs.scale(&factor);
            for k in 0..acc.len() {
                let v = self.rows[r].coeffs[k].clone() * factor.clone();
                acc[k] = acc[k].clone() - v;
            }
            acc[j] = S::zero();
        }

        if acc.iter().all(Scalar::is_pivot_zero) {
            // Variable-free residue decides the row on its own.
            let sat = if is_eq { rhs.sign() == 0 } else { rhs.sign() >= 0 };
            return if sat { LpOutcome::Feasible } else { LpOutcome::Infeasible };
        }

        if !is_eq {
            let s = self.new_col(ColKind::Slack);
            acc.push(S::one());
            if rhs.sign() >= 0 {
                // Satisfied at the current vertex: slack becomes basic and
                // nothing else moves.
                let ri = self.rows.len();
                self.rows.push(Row { coeffs: acc, rhs, basic: s });
                self.col_basic[s] = Some(ri);
                return LpOutcome::Feasible;
            }
        }

        if rhs.sign() < 0 {
            for c in acc.iter_mut() {
                *c = -c.clone();
            }
            rhs = -rhs;
        }
        let art = self.new_col(ColKind::Artificial);
        acc.push(S::one());
        let ri = self.rows.len();
        self.rows.push(Row { coeffs: acc, rhs, basic: art });
        self.col_basic[art] = Some(ri);
        self.repair_artificial(art, budget)
    }

    /// Phase 1 for one freshly added artificial: minimize it to zero, then
    /// retire its column.
    fn repair_artificial(&mut self, art: usize, budget: &SolveBudget) -> LpOutcome {
        match self.minimize(&[art], budget) {
            OptResult::TimedOut => return LpOutcome::TimedOut,
            OptResult::PivotLimit => return LpOutcome::Aborted("pivot limit"),
            OptResult::Unbounded => return LpOutcome::Aborted("unbounded phase-1 objective"),
            OptResult::Optimal(z) => {
                if z.sign() != 0 {
                    return LpOutcome::Infeasible;
                }
            }
        }
        if let Some(r) = self.col_basic[art] {
            // Degenerate: the artificial is basic at zero. Pivot it out on
            // any live nonbasic column, or drop the now-redundant row.
            let pivot_col = (0..self.cols.len()).find(|&j| {
                j != art
                    && !self.cols[j].dead
                    && self.col_basic[j].is_none()
                    && !self.rows[r].coeffs[j].is_pivot_zero()
            });
            match pivot_col {
                Some(j) => self.pivot(r, j),
                None => self.drop_row(r),
            }
        }
        self.cols[art].dead = true;
        LpOutcome::Feasible
    }

    fn drop_row(&mut self, r: usize) {
        let basic = self.rows[r].basic;
        self.col_basic[basic] = None;
        self.rows.swap_remove(r);
        if r < self.rows.len() {
            let moved = self.rows[r].basic;
            self.col_basic[moved] = Some(r);
        }
    }

    /// Minimize the sum of the given columns' values with Bland's rule.
    fn minimize(&mut self, obj_cols: &[usize], budget: &SolveBudget) -> OptResult<S> {
        // Reduced costs: objective = z_val + Σ z[j]·x_j over nonbasics.
        let mut z = vec![S::zero(); self.cols.len()];
        for &c in obj_cols {
            z[c] = S::one();
        }
        let mut z_val = Delta::zero();
        for r in 0..self.rows.len() {
            let b = self.rows[r].basic;
            if z[b].is_pivot_zero() {
                continue;
            }
            let f = z[b].clone();
            z_val = z_val + self.rows[r].rhs.scale(&f);
            for k in 0..z.len() {
                let v = self.rows[r].coeffs[k].clone() * f.clone();
                z[k] = z[k].clone() - v;
            }
            z[b] = S::zero();
        }

        let mut local_pivots = 0usize;
        loop {
            if let Some(deadline) = budget.deadline {
                if Instant::now() >= deadline {
                    return OptResult::TimedOut;
                }
            }
            if local_pivots >= budget.max_pivots {
                return OptResult::PivotLimit;
            }

            // Bland: lowest-index improving column enters.
            let entering = (0..self.cols.len()).find(|&j| {
                !self.cols[j].dead && self.col_basic[j].is_none() && pivot_sign(&z[j]) < 0
            });
            let Some(e) = entering else {
                return OptResult::Optimal(z_val);
            };

            // Ratio test; ties leave the lowest basic column (Bland).
            let mut leaving: Option<(usize, Delta<S>)> = None;
            for r in 0..self.rows.len() {
                let a = &self.rows[r].coeffs[e];
                if pivot_sign(a) <= 0 {
                    continue;
                }
                let ratio = self.rows[r].rhs.scale(&a.recip());
                let better = match &leaving {
                    None => true,
                    Some((lr, lratio)) => match ratio.lex_cmp(lratio) {
                        Ordering::Less => true,
                        Ordering::Equal => self.rows[r].basic < self.rows[*lr].basic,
                        Ordering::Greater => false,
                    },
                };
                if better {
                    leaving = Some((r, ratio));
                }
            }
            let Some((r, _)) = leaving else {
                return OptResult::Unbounded;
            };

            trace!(target: "pathsat::lra", "pivot row {} col {}", r, e);
            self.pivot(r, e);
            local_pivots += 1;

            // Eliminate the entering column from the reduced costs.
            let f = z[e].clone();
            if !f.is_pivot_zero() {
                z_val = z_val + self.rows[r].rhs.scale(&f);
                for k in 0..z.len() {
                    let v = self.rows[r].coeffs[k].clone() * f.clone();
                    z[k] = z[k].clone() - v;
                }
                z[e] = S::zero();
            }
        }
    }

    fn pivot(&mut self, r: usize, e: usize) {
        let old_basic = self.rows[r].basic;
        let inv = self.rows[r].coeffs[e].recip();
        {
            let row = &mut self.rows[r];
            for c in row.coeffs.iter_mut() {
                *c = c.clone() * inv.clone();
            }
            row.coeffs[e] = S::one();
            row.rhs = row.rhs.scale(&inv);
            row.basic = e;
        }
        let pivot_coeffs = self.rows[r].coeffs.clone();
        let pivot_rhs = self.rows[r].rhs.clone();
        for i in 0..self.rows.len() {
            if i == r {
                continue;
            }
            let f = self.rows[i].coeffs[e].clone();
            if f.is_pivot_zero() {
                self.rows[i].coeffs[e] = S::zero();
                continue;
            }
            let row = &mut self.rows[i];
            for k in 0..row.coeffs.len() {
                let v = pivot_coeffs[k].clone() * f.clone();
                row.coeffs[k] = row.coeffs[k].clone() - v;
            }
            row.coeffs[e] = S::zero();
            row.rhs = row.rhs.clone() - pivot_rhs.scale(&f);
        }
        self.col_basic[old_basic] = None;
        self.col_basic[e] = Some(r);
        self.pivots += 1;
    }

    fn col_value(&self, c: usize) -> Delta<S> {
        match self.col_basic[c] {
            Some(r) => self.rows[r].rhs.clone(),
            None => Delta::zero(),
        }
    }

    /// Extract the current vertex, choosing a concrete δ small enough that
    /// every row stays satisfied when the infinitesimal is substituted.
    #[must_use]
    pub fn model(&self) -> LpModel<S> {
        let mut delta = S::one();
        for row in &self.rows {
            if pivot_sign(&row.rhs.real) > 0 && pivot_sign(&row.rhs.eps) < 0 {
                let bound = row.rhs.real.clone() / -row.rhs.eps.clone();
                if bound < delta {
                    delta = bound;
                }
            }
        }
        let mut values = HashMap::new();
        for (i, pair) in self.var_cols.iter().enumerate() {
            let Some((pos, neg)) = pair else { continue };
            let vp = self.col_value(*pos).concretize(&delta);
            let vn = self.col_value(*neg).concretize(&delta);
            values.insert(VarId(i as u32), vp - vn);
        }
        LpModel { values, delta }
    }

    /// Express a structural variable over the live nonbasic columns:
    /// `x = rhs + Σ coeff·col`. The Gomory layer derives cuts from this
    /// row. `None` if the variable has no columns.
    #[must_use]
    pub fn variable_row(&self, v: VarId) -> Option<(Delta<S>, Vec<(usize, S)>)> {
        let (pos, neg) = self.var_cols.get(v.0 as usize).copied().flatten()?;
        let mut rhs = Delta::zero();
        let mut coeffs = vec![S::zero(); self.cols.len()];
        for (col, positive) in [(pos, true), (neg, false)] {
            match self.col_basic[col] {
                Some(r) => {
                    let row = &self.rows[r];
                    rhs = if positive {
                        rhs + row.rhs.clone()
                    } else {
                        rhs - row.rhs.clone()
                    };
                    for (k, c) in row.coeffs.iter().enumerate() {
                        if k == col {
                            continue;
                        }
                        let v = if positive { -c.clone() } else { c.clone() };
                        coeffs[k] = coeffs[k].clone() + v;
                    }
                }
                None => {
                    let v = if positive { S::one() } else { -S::one() };
                    coeffs[col] = coeffs[col].clone() + v;
                }
            }
        }
        let out = coeffs
            .into_iter()
            .enumerate()
            .filter(|(j, c)| {
                !self.cols[*j].dead && self.col_basic[*j].is_none() && !c.is_pivot_zero()
            })
            .collect();
        Some((rhs, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;
    use num_traits::Zero;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    fn unlimited() -> SolveBudget {
        SolveBudget::unlimited()
    }

    #[test]
    fn satisfied_rows_do_not_pivot() {
        let mut lp: Simplex<BigRational> = Simplex::new();
        // x <= 5 is satisfied at the origin.
        let out = lp.add_constraint(&[(VarId(0), rat(1))], Relation::Le, rat(5), &unlimited());
        assert_eq!(out, LpOutcome::Feasible);
        assert_eq!(lp.stats().pivots, 0);
        let m = lp.model();
        assert_eq!(m.value(VarId(0)), Some(&BigRational::zero()));
    }

    #[test]
    fn lower_bounds_repair_through_phase_one() {
        let mut lp: Simplex<BigRational> = Simplex::new();
        // x >= 2  as  -x <= -2.
        let out = lp.add_constraint(&[(VarId(0), rat(-1))], Relation::Le, rat(-2), &unlimited());
        assert_eq!(out, LpOutcome::Feasible);
        let m = lp.model();
        assert_eq!(m.value(VarId(0)), Some(&rat(2)));
    }

    #[test]
    fn conflicting_bounds_are_infeasible() {
        let mut lp: Simplex<BigRational> = Simplex::new();
        assert_eq!(
            lp.add_constraint(&[(VarId(0), rat(1))], Relation::Le, rat(1), &unlimited()),
            LpOutcome::Feasible
        );
        assert_eq!(
            lp.add_constraint(&[(VarId(0), rat(-1))], Relation::Le, rat(-2), &unlimited()),
            LpOutcome::Infeasible
        );
    }

    #[test]
    fn strict_bounds_concretize_between() {
        let mut lp: Simplex<BigRational> = Simplex::new();
        // 0 < x < 1.
        assert_eq!(
            lp.add_constraint(&[(VarId(0), rat(-1))], Relation::Lt, rat(0), &unlimited()),
            LpOutcome::Feasible
        );
        assert_eq!(
            lp.add_constraint(&[(VarId(0), rat(1))], Relation::Lt, rat(1), &unlimited()),
            LpOutcome::Feasible
        );
        let m = lp.model();
        let x = m.value(VarId(0)).unwrap().clone();
        assert!(x > BigRational::zero() && x < rat(1));
    }

    #[test]
    fn equalities_hold_exactly() {
        let mut lp: Simplex<BigRational> = Simplex::new();
        // x + y == 3, x - y == 1  =>  x = 2, y = 1.
        assert_eq!(
            lp.add_constraint(
                &[(VarId(0), rat(1)), (VarId(1), rat(1))],
                Relation::Eq,
                rat(3),
                &unlimited()
            ),
            LpOutcome::Feasible
        );
        assert_eq!(
            lp.add_constraint(
                &[(VarId(0), rat(1)), (VarId(1), rat(-1))],
                Relation::Eq,
                rat(1),
                &unlimited()
            ),
            LpOutcome::Feasible
        );
        let m = lp.model();
        assert_eq!(m.value(VarId(0)), Some(&rat(2)));
        assert_eq!(m.value(VarId(1)), Some(&rat(1)));
    }

    #[test]
    fn checkpoints_restore_exactly() {
        let mut lp: Simplex<BigRational> = Simplex::new();
        lp.add_constraint(&[(VarId(0), rat(1))], Relation::Le, rat(4), &unlimited());
        let cp = lp.checkpoint();
        let before = lp.model();
        assert_eq!(
            lp.add_constraint(&[(VarId(0), rat(-1))], Relation::Le, rat(-3), &unlimited()),
            LpOutcome::Feasible
        );
        assert_eq!(lp.model().value(VarId(0)), Some(&rat(3)));
        lp.restore(&cp);
        let after = lp.model();
        assert_eq!(before.value(VarId(0)), after.value(VarId(0)));
        assert_eq!(lp.stats().rows, 1);
    }

    #[test]
    fn variable_row_reconstructs_the_vertex() {
        let mut lp: Simplex<BigRational> = Simplex::new();
        lp.add_constraint(&[(VarId(0), rat(-2))], Relation::Le, rat(-3), &unlimited());
        // x = 3/2 at the vertex; the row must agree at nonbasic = 0.
        let (rhs, _) = lp.variable_row(VarId(0)).unwrap();
        assert_eq!(rhs.real, BigRational::new(3.into(), 2.into()));
    }
}
