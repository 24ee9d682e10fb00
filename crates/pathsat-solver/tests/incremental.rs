//! Integration tests for the incremental solver facade
//!
//! Covers the solver contract end to end: soundness of returned solutions,
//! the push/pop inverse law, query idempotence, infeasibility as a value,
//! integer solving, the nontermination guard, and the float backend's
//! post-solving pass.

use num_rational::BigRational;
use num_traits::Zero;
use pathsat_core::{
    ConstraintExpression, NumericConstant, NumericVariable, PrimitiveType, Solution, Term,
};
use pathsat_solver::{
    Feasibility, IncrementalSolver, NumericBackend, SolveOutcome, SolverConfig, SolverError,
};

fn dvar(name: &str) -> Term {
    Term::var(NumericVariable::new(name, PrimitiveType::Double))
}

fn ivar(name: &str) -> Term {
    Term::var(NumericVariable::new(name, PrimitiveType::Int))
}

fn rational(sol: &Solution, name: &str, ty: PrimitiveType) -> BigRational {
    sol.get(&NumericVariable::new(name, ty))
        .and_then(NumericConstant::to_rational)
        .unwrap_or_else(|| panic!("no binding for {}", name))
}

/// The running example: y <= x+3, y >= -x+3, y >= 0.5x.
fn running_example(solver: &mut IncrementalSolver) {
    let x = || dvar("x");
    let y = || dvar("y");
    solver
        .add_constraint(&ConstraintExpression::le(
            y(),
            Term::sum(x(), Term::double(3.0)),
        ))
        .unwrap();
    solver
        .add_constraint(&ConstraintExpression::ge(
            y(),
            Term::sum(Term::neg(x()), Term::double(3.0)),
        ))
        .unwrap();
    solver
        .add_constraint(&ConstraintExpression::ge(
            y(),
            Term::product(Term::double(0.5), x()),
        ))
        .unwrap();
}

fn check_running_example(sol: &Solution, tol: f64) {
    let x = rational(sol, "x", PrimitiveType::Double);
    let y = rational(sol, "y", PrimitiveType::Double);
    let tol = BigRational::from_float(tol).unwrap_or_else(BigRational::zero);
    let three = BigRational::from_integer(3.into());
    let half = BigRational::new(1.into(), 2.into());
    assert!(&y - (&x + &three) <= tol, "y <= x + 3 violated");
    assert!((-&x + &three) - &y <= tol, "y >= -x + 3 violated");
    assert!(&half * &x - &y <= tol, "y >= 0.5x violated");
}

#[test]
fn running_example_is_feasible_and_sound() {
    let mut solver = IncrementalSolver::with_defaults();
    running_example(&mut solver);
    let SolveOutcome::Feasible(sol) = solver.solution() else {
        panic!("running example must be feasible");
    };
    check_running_example(&sol, 0.0);
}

#[test]
fn add_then_remove_restores_the_feasibility_region() {
    let mut solver = IncrementalSolver::with_defaults();
    running_example(&mut solver);
    let before = solver.solution();
    assert!(matches!(before, SolveOutcome::Feasible(_)));

    // y >= -0.6x + 4.4 narrows the region; removing it must restore the
    // original three-constraint solution behavior exactly.
    solver
        .add_constraint(&ConstraintExpression::ge(
            dvar("y"),
            Term::sum(
                Term::product(Term::double(-0.6), dvar("x")),
                Term::double(4.4),
            ),
        ))
        .unwrap();
    if let SolveOutcome::Feasible(narrowed) = solver.solution() {
        check_running_example(&narrowed, 0.0);
    }
    solver.remove_constraint().unwrap();
    assert_eq!(solver.solution(), before);
}

#[test]
fn push_pop_is_the_identity() {
    let mut solver = IncrementalSolver::with_defaults();
    running_example(&mut solver);
    let before = solver.solution();
    solver
        .add_constraint(&ConstraintExpression::le(dvar("x"), Term::double(-7.0)))
        .unwrap();
    solver.remove_constraint().unwrap();
    assert_eq!(solver.solution(), before);
    assert_eq!(solver.depth(), 3);
}

#[test]
fn requeries_are_idempotent() {
    let mut solver = IncrementalSolver::with_defaults();
    running_example(&mut solver);
    let first = solver.solution();
    let second = solver.solution();
    let third = solver.solution();
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn infeasibility_is_an_outcome_not_an_error() {
    let mut solver = IncrementalSolver::with_defaults();
    solver
        .add_constraint(&ConstraintExpression::le(dvar("x"), Term::double(1.0)))
        .unwrap();
    solver
        .add_constraint(&ConstraintExpression::ge(dvar("x"), Term::double(2.0)))
        .unwrap();
    assert_eq!(solver.solution(), SolveOutcome::Infeasible);
    assert_eq!(solver.is_satisfiable(), Feasibility::Infeasible);

    // Backtracking out of the dead branch revives the stack.
    solver.remove_constraint().unwrap();
    assert!(matches!(solver.solution(), SolveOutcome::Feasible(_)));
}

#[test]
fn integer_branch_and_bound_returns_integral_solutions() {
    // 2a + b + 1 <= 4 and a + b >= 3 over integers.
    let mut solver = IncrementalSolver::with_defaults();
    solver
        .add_constraint(&ConstraintExpression::le(
            Term::sum(
                Term::sum(Term::product(Term::int(2), ivar("a")), ivar("b")),
                Term::int(1),
            ),
            Term::int(4),
        ))
        .unwrap();
    solver
        .add_constraint(&ConstraintExpression::ge(
            Term::sum(ivar("a"), ivar("b")),
            Term::int(3),
        ))
        .unwrap();
    let SolveOutcome::Feasible(sol) = solver.solution() else {
        panic!("integer scenario must be feasible");
    };
    let a = rational(&sol, "a", PrimitiveType::Int);
    let b = rational(&sol, "b", PrimitiveType::Int);
    assert!(a.is_integer() && b.is_integer());
    let two = BigRational::from_integer(2.into());
    let three = BigRational::from_integer(3.into());
    let four = BigRational::from_integer(4.into());
    assert!(&two * &a + &b + BigRational::from_integer(1.into()) <= four);
    assert!(&a + &b >= three);
}

#[test]
fn gcd_infeasible_integers_terminate_within_budget() {
    // 3a - 3b >= 1 and 3a - 3b <= 2 over integers: infeasible, and a
    // known driver of endless branching. The budgets must end the query
    // with a decision or a gave-up outcome, never a hang.
    let config = SolverConfig {
        max_nodes: 64,
        max_cuts: 16,
        ..SolverConfig::default()
    };
    let mut solver = IncrementalSolver::new(config);
    let lhs = || {
        Term::difference(
            Term::product(Term::int(3), ivar("a")),
            Term::product(Term::int(3), ivar("b")),
        )
    };
    solver
        .add_constraint(&ConstraintExpression::ge(lhs(), Term::int(1)))
        .unwrap();
    solver
        .add_constraint(&ConstraintExpression::le(lhs(), Term::int(2)))
        .unwrap();
    match solver.solution() {
        SolveOutcome::Infeasible | SolveOutcome::Unknown(_) => {}
        other => panic!("expected a decided or gave-up outcome, got {:?}", other),
    }
}

#[test]
fn removing_from_an_empty_stack_is_a_usage_error() {
    let mut solver = IncrementalSolver::with_defaults();
    assert!(matches!(
        solver.remove_constraint(),
        Err(SolverError::IncorrectUse(_))
    ));
}

#[test]
fn type_errors_surface_and_leave_state_unchanged() {
    let mut solver = IncrementalSolver::with_defaults();
    let bad = ConstraintExpression::eq(
        Term::Constant(NumericConstant::Boolean(true)),
        Term::int(1),
    );
    assert!(matches!(
        solver.add_constraint(&bad),
        Err(SolverError::Normalize(_))
    ));
    assert_eq!(solver.depth(), 0);
    assert!(matches!(solver.solution(), SolveOutcome::Feasible(_)));
}

#[test]
fn reset_returns_to_the_empty_state() {
    let mut solver = IncrementalSolver::with_defaults();
    solver
        .add_constraint(&ConstraintExpression::le(dvar("x"), Term::double(1.0)))
        .unwrap();
    solver
        .add_constraint(&ConstraintExpression::ge(dvar("x"), Term::double(2.0)))
        .unwrap();
    assert_eq!(solver.solution(), SolveOutcome::Infeasible);
    solver.reset();
    assert_eq!(solver.depth(), 0);
    assert!(matches!(solver.solution(), SolveOutcome::Feasible(_)));
}

#[test]
fn disequalities_solve_through_disjunction() {
    let mut solver = IncrementalSolver::with_defaults();
    solver
        .add_constraint(&ConstraintExpression::ne(dvar("x"), Term::double(3.0)))
        .unwrap();
    let SolveOutcome::Feasible(sol) = solver.solution() else {
        panic!("x != 3 must be feasible");
    };
    let x = rational(&sol, "x", PrimitiveType::Double);
    assert_ne!(x, BigRational::from_integer(3.into()));
}

#[test]
fn modulo_constraints_solve_with_java_remainder_semantics() {
    let mut solver = IncrementalSolver::with_defaults();
    solver
        .add_constraint(&ConstraintExpression::eq(
            Term::modulo(ivar("x"), Term::int(3)),
            Term::int(2),
        ))
        .unwrap();
    let SolveOutcome::Feasible(sol) = solver.solution() else {
        panic!("x % 3 == 2 must be feasible");
    };
    let x = rational(&sol, "x", PrimitiveType::Int);
    assert!(x.is_integer());
    let xi: i64 = x.to_integer().try_into().unwrap();
    // A remainder of +2 forces a nonnegative dividend.
    assert!(xi >= 0 && xi % 3 == 2);
}

#[test]
fn shared_nonlinear_subterms_share_one_substitution() {
    // Two constraints over the same truncating division must linearize
    // through the same fresh variable for incremental solving to be sound.
    let mut solver = IncrementalSolver::with_defaults();
    let half = || Term::quotient(ivar("x"), Term::int(2));
    solver
        .add_constraint(&ConstraintExpression::ge(half(), Term::int(1)))
        .unwrap();
    assert_eq!(solver.substitution_count(), 1);
    solver
        .add_constraint(&ConstraintExpression::le(half(), Term::int(1)))
        .unwrap();
    assert_eq!(solver.substitution_count(), 1);

    let SolveOutcome::Feasible(sol) = solver.solution() else {
        panic!("x / 2 == 1 must be feasible");
    };
    let x = rational(&sol, "x", PrimitiveType::Int);
    let xi: i64 = x.to_integer().try_into().unwrap();
    assert_eq!(xi / 2, 1);

    solver.remove_constraint().unwrap();
    solver.remove_constraint().unwrap();
    assert_eq!(solver.substitution_count(), 0);
}

#[test]
fn narrowing_casts_truncate_toward_zero() {
    // (int) d == 2 pins d into [2, 3).
    let mut solver = IncrementalSolver::with_defaults();
    solver
        .add_constraint(&ConstraintExpression::eq(
            Term::cast(PrimitiveType::Int, dvar("d")),
            Term::int(2),
        ))
        .unwrap();
    let SolveOutcome::Feasible(sol) = solver.solution() else {
        panic!("(int) d == 2 must be feasible");
    };
    let d = rational(&sol, "d", PrimitiveType::Double);
    let two = BigRational::from_integer(2.into());
    let three = BigRational::from_integer(3.into());
    assert!(d >= two && d < three);
}

#[test]
fn float_backend_validates_the_running_example() {
    let config = SolverConfig {
        backend: NumericBackend::Float,
        ..SolverConfig::default()
    };
    let mut solver = IncrementalSolver::new(config);
    running_example(&mut solver);
    let SolveOutcome::Feasible(sol) = solver.solution() else {
        panic!("running example must validate on the float backend");
    };
    check_running_example(&sol, 1e-6);
}

#[test]
fn float_backend_decides_infeasibility() {
    let config = SolverConfig {
        backend: NumericBackend::Float,
        ..SolverConfig::default()
    };
    let mut solver = IncrementalSolver::new(config);
    solver
        .add_constraint(&ConstraintExpression::le(dvar("x"), Term::double(1.0)))
        .unwrap();
    solver
        .add_constraint(&ConstraintExpression::ge(dvar("x"), Term::double(2.0)))
        .unwrap();
    assert_eq!(solver.solution(), SolveOutcome::Infeasible);
}

#[test]
fn strict_inequalities_stay_strict() {
    let mut solver = IncrementalSolver::with_defaults();
    solver
        .add_constraint(&ConstraintExpression::gt(dvar("x"), Term::double(0.0)))
        .unwrap();
    solver
        .add_constraint(&ConstraintExpression::lt(dvar("x"), Term::double(1.0)))
        .unwrap();
    let SolveOutcome::Feasible(sol) = solver.solution() else {
        panic!("0 < x < 1 must be feasible");
    };
    let x = rational(&sol, "x", PrimitiveType::Double);
    assert!(x > BigRational::zero());
    assert!(x < BigRational::from_integer(1.into()));
}
