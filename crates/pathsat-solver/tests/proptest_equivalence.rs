//! Property-based tests for the facade contract
//!
//! Random push/pop scripts over small integer constraint systems,
//! cross-checking the incremental solver against a from-scratch solver fed
//! the same net stack, and validating returned solutions against the
//! constraints they came from.

use num_rational::BigRational;
use pathsat_core::{ConstraintExpression, NumericConstant, NumericVariable, PrimitiveType, Term};
use pathsat_solver::{IncrementalSolver, SolveOutcome, SolverConfig};
use proptest::prelude::*;

const NAMES: [&str; 3] = ["a", "b", "c"];

#[derive(Clone, Debug)]
enum Op {
    Push {
        coeffs: Vec<i32>,
        rel: u8,
        bound: i32,
    },
    Pop,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (prop::collection::vec(-3i32..=3, 3), 0u8..3u8, -5i32..=5).prop_map(
            |(coeffs, rel, bound)| Op::Push { coeffs, rel, bound }
        ),
        1 => Just(Op::Pop),
    ]
}

fn ivar(name: &str) -> Term {
    Term::var(NumericVariable::new(name, PrimitiveType::Int))
}

fn build_expr(coeffs: &[i32], rel: u8, bound: i32) -> ConstraintExpression {
    let mut lhs: Option<Term> = None;
    for (i, &c) in coeffs.iter().enumerate() {
        if c == 0 {
            continue;
        }
        let t = Term::product(Term::int(c), ivar(NAMES[i]));
        lhs = Some(match lhs {
            None => t,
            Some(acc) => Term::sum(acc, t),
        });
    }
    let lhs = lhs.unwrap_or_else(|| Term::int(0));
    let rhs = Term::int(bound);
    match rel % 3 {
        0 => ConstraintExpression::le(lhs, rhs),
        1 => ConstraintExpression::ge(lhs, rhs),
        _ => ConstraintExpression::eq(lhs, rhs),
    }
}

fn test_config(incremental: bool) -> SolverConfig {
    SolverConfig {
        incremental,
        max_nodes: 200,
        max_cuts: 16,
        ..SolverConfig::default()
    }
}

fn holds(sol: &pathsat_core::Solution, coeffs: &[i32], rel: u8, bound: i32) -> bool {
    let mut lhs = BigRational::from_integer(0.into());
    for (i, &c) in coeffs.iter().enumerate() {
        if c == 0 {
            continue;
        }
        let v = sol
            .get(&NumericVariable::new(NAMES[i], PrimitiveType::Int))
            .and_then(NumericConstant::to_rational)
            .expect("feasible solutions bind every constrained variable");
        lhs += BigRational::from_integer(c.into()) * v;
    }
    let bound = BigRational::from_integer(bound.into());
    match rel % 3 {
        0 => lhs <= bound,
        1 => lhs >= bound,
        _ => lhs == bound,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Incremental and from-scratch solving agree on every prefix of any
    /// push/pop script, including the witnesses they return.
    #[test]
    fn incremental_matches_from_scratch(ops in prop::collection::vec(op_strategy(), 1..12)) {
        let mut incremental = IncrementalSolver::new(test_config(true));
        let mut scratch = IncrementalSolver::new(test_config(false));
        for op in &ops {
            match op {
                Op::Push { coeffs, rel, bound } => {
                    let e = build_expr(coeffs, *rel, *bound);
                    incremental.add_constraint(&e).unwrap();
                    scratch.add_constraint(&e).unwrap();
                }
                Op::Pop => {
                    if incremental.depth() > 0 {
                        incremental.remove_constraint().unwrap();
                        scratch.remove_constraint().unwrap();
                    }
                }
            }
            prop_assert_eq!(incremental.solution(), scratch.solution());
        }
    }

    /// Every feasible answer satisfies the exact constraint stack it was
    /// produced for.
    #[test]
    fn solutions_satisfy_their_stacks(
        pushes in prop::collection::vec(
            (prop::collection::vec(-3i32..=3, 3), 0u8..3u8, -5i32..=5),
            1..8,
        )
    ) {
        let mut solver = IncrementalSolver::new(test_config(true));
        for (coeffs, rel, bound) in &pushes {
            solver
                .add_constraint(&build_expr(coeffs, *rel, *bound))
                .unwrap();
        }
        if let SolveOutcome::Feasible(sol) = solver.solution() {
            for (coeffs, rel, bound) in &pushes {
                prop_assert!(holds(&sol, coeffs, *rel, *bound));
            }
        }
    }

    /// add(c); remove() is invisible to any later query.
    #[test]
    fn push_pop_round_trip_is_identity(
        base in prop::collection::vec(
            (prop::collection::vec(-3i32..=3, 3), 0u8..3u8, -5i32..=5),
            0..5,
        ),
        probe in (prop::collection::vec(-3i32..=3, 3), 0u8..3u8, -5i32..=5),
    ) {
        let mut solver = IncrementalSolver::new(test_config(true));
        for (coeffs, rel, bound) in &base {
            solver
                .add_constraint(&build_expr(coeffs, *rel, *bound))
                .unwrap();
        }
        let before = solver.solution();
        let (coeffs, rel, bound) = &probe;
        solver
            .add_constraint(&build_expr(coeffs, *rel, *bound))
            .unwrap();
        solver.remove_constraint().unwrap();
        prop_assert_eq!(solver.solution(), before);
    }
}
