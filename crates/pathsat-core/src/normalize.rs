//! Constraint expression normalization
//!
//! Converts an arbitrary boolean [`ConstraintExpression`] tree into a
//! [`ComposedConstraint`]: a disjunction of conjunctive systems of linear
//! (in)equations. The pipeline per comparison leaf:
//!
//! 1. negations are pushed onto the comparison operators (NNF), then
//!    conjunction distributes over disjunction (DNF);
//! 2. nested fractions are cleared by multiplying through, recording every
//!    divisor for a nonzero side condition;
//! 3. a remaining top-level real quotient is removed by a denominator sign
//!    split (`den > 0 ∧ num ⋈ 0` vs `den < 0` with the flipped relation);
//! 4. narrowing casts, modulo and truncating integer division are replaced
//!    by fresh variables with linear side constraints, cached per
//!    structural subterm in the [`SubstitutionTable`];
//! 5. all-integer (in)equations are tightened (`p < 0` becomes `p ≤ -1`
//!    after denominator scaling).
//!
//! Structurally equal subterms normalize to the same fresh variable while
//! no pop has invalidated the substitution, which keeps incremental solving
//! sound when path-condition constraints share non-linear subexpressions.

use crate::constant::NumericConstant;
use crate::constraint::{ComposedConstraint, ConstraintSystem, Relation, SingleConstraint};
use crate::error::{NormalizeError, TypeCheckError};
use crate::expr::{CmpOp, ConstraintExpression};
use crate::poly::Polynomial;
use crate::subst::SubstitutionTable;
use crate::term::Term;
use log::debug;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// Hard cap on DNF growth; exceeding it is a [`NormalizeError::DnfOverflow`].
const MAX_DNF_SYSTEMS: usize = 512;

/// Normalize a constraint expression into disjunctive normal form over
/// linear constraints, threading substitutions through `table`.
pub fn normalize(
    expr: &ConstraintExpression,
    table: &mut SubstitutionTable,
) -> Result<ComposedConstraint, NormalizeError> {
    to_dnf(expr, table)
}

fn and_capped(
    a: &ComposedConstraint,
    b: &ComposedConstraint,
) -> Result<ComposedConstraint, NormalizeError> {
    a.and(b, MAX_DNF_SYSTEMS)
        .ok_or(NormalizeError::DnfOverflow(MAX_DNF_SYSTEMS))
}

fn to_dnf(
    expr: &ConstraintExpression,
    table: &mut SubstitutionTable,
) -> Result<ComposedConstraint, NormalizeError> {
    match expr {
        ConstraintExpression::Bool(true) => Ok(ComposedConstraint::trivially_true()),
        ConstraintExpression::Bool(false) => Ok(ComposedConstraint::unsatisfiable()),
        ConstraintExpression::Cmp(op, l, r) => comparison(*op, l, r, table),
        ConstraintExpression::And(a, b) => {
            let ca = to_dnf(a, table)?;
            let cb = to_dnf(b, table)?;
            and_capped(&ca, &cb)
        }
        ConstraintExpression::Or(a, b) => {
            let ca = to_dnf(a, table)?;
            let cb = to_dnf(b, table)?;
            Ok(ca.or(&cb))
        }
        ConstraintExpression::Not(e) => {
            let n = negated(e)?;
            to_dnf(&n, table)
        }
        ConstraintExpression::Type(t) => {
            Err(TypeCheckError::NonArithmeticConstraint(t.to_string()).into())
        }
    }
}

/// Push one negation down (De Morgan; comparisons flip their operator).
fn negated(expr: &ConstraintExpression) -> Result<ConstraintExpression, NormalizeError> {
    match expr {
        ConstraintExpression::Bool(b) => Ok(ConstraintExpression::Bool(!b)),
        ConstraintExpression::Cmp(op, l, r) => Ok(ConstraintExpression::Cmp(
            op.negated(),
            l.clone(),
            r.clone(),
        )),
        ConstraintExpression::Not(e) => Ok((**e).clone()),
        ConstraintExpression::And(a, b) => Ok(ConstraintExpression::or(negated(a)?, negated(b)?)),
        ConstraintExpression::Or(a, b) => Ok(ConstraintExpression::and(negated(a)?, negated(b)?)),
        ConstraintExpression::Type(t) => {
            Err(TypeCheckError::NonArithmeticConstraint(t.to_string()).into())
        }
    }
}

fn comparison(
    op: CmpOp,
    l: &Term,
    r: &Term,
    table: &mut SubstitutionTable,
) -> Result<ComposedConstraint, NormalizeError> {
    let tl = l.check_types().map_err(NormalizeError::from)?;
    let tr = r.check_types().map_err(NormalizeError::from)?;
    if !tl.is_numeric() || !tr.is_numeric() {
        return Err(TypeCheckError::NonNumericComparison(format!(
            "({} {} {})",
            l, op, r
        ))
        .into());
    }
    match op {
        CmpOp::Lt => rel_composed(Term::difference(l.clone(), r.clone()), Relation::Lt, table),
        CmpOp::Le => rel_composed(Term::difference(l.clone(), r.clone()), Relation::Le, table),
        CmpOp::Gt => rel_composed(Term::difference(r.clone(), l.clone()), Relation::Lt, table),
        CmpOp::Ge => rel_composed(Term::difference(r.clone(), l.clone()), Relation::Le, table),
        CmpOp::Eq => rel_composed(Term::difference(l.clone(), r.clone()), Relation::Eq, table),
        CmpOp::Ne => {
            let below = rel_composed(Term::difference(l.clone(), r.clone()), Relation::Lt, table)?;
            let above = rel_composed(Term::difference(r.clone(), l.clone()), Relation::Lt, table)?;
            Ok(below.or(&above))
        }
    }
}

/// Normalize `term ⋈ 0` into DNF, including all side conditions.
fn rel_composed(
    term: Term,
    rel: Relation,
    table: &mut SubstitutionTable,
) -> Result<ComposedConstraint, NormalizeError> {
    let mut dens = Vec::new();
    let cleared = term.clear_multi_fractions(&mut dens);

    let mut sides: Vec<ComposedConstraint> = Vec::new();
    for den in dens {
        let nz = comparison(CmpOp::Ne, &den, &Term::int(0), table)?;
        sides.push(nz);
    }

    let main = match real_quotient(&cleared) {
        Some((num, den)) => {
            let den_e = eliminate(den, table, &mut sides)?;
            let den_poly = den_e.to_polynomial().map_err(NormalizeError::from)?;
            let num_e = eliminate(num, table, &mut sides)?;
            let num_poly = num_e.to_polynomial().map_err(NormalizeError::from)?;
            match den_poly.as_constant() {
                Some(c) if c.is_zero() => ComposedConstraint::unsatisfiable(),
                Some(c) => {
                    // Constant divisor: divide through (relation flips on
                    // negative constants via the sign of the scale).
                    let scaled = num_poly.scale(&c.recip());
                    let p = if *c < BigRational::from_integer(0.into()) {
                        scaled.neg()
                    } else {
                        scaled
                    };
                    composed_single(p, rel)
                }
                None => {
                    // den > 0 ∧ num ⋈ 0, or den < 0 with the relation
                    // mirrored.
                    let pos = and_capped(
                        &composed_single(den_poly.neg(), Relation::Lt),
                        &composed_single(num_poly.clone(), rel),
                    )?;
                    let mirrored = match rel {
                        Relation::Eq => num_poly,
                        Relation::Le | Relation::Lt => num_poly.neg(),
                    };
                    let neg = and_capped(
                        &composed_single(den_poly, Relation::Lt),
                        &composed_single(mirrored, rel),
                    )?;
                    pos.or(&neg)
                }
            }
        }
        None => {
            let e = eliminate(&cleared, table, &mut sides)?;
            let p = e.to_polynomial().map_err(NormalizeError::from)?;
            composed_single(p, rel)
        }
    };

    let mut out = main;
    for side in sides {
        out = and_capped(&out, &side)?;
    }
    Ok(out)
}

/// A top-level real-valued quotient, if the cleared term is one.
fn real_quotient(cleared: &Term) -> Option<(&Term, &Term)> {
    if let Term::Quotient(a, b) = cleared {
        let integral = cleared
            .check_types()
            .map(|t| t.is_integer())
            .unwrap_or(true);
        if !integral {
            return Some((a.as_ref(), b.as_ref()));
        }
    }
    None
}

fn composed_single(p: Polynomial, rel: Relation) -> ComposedConstraint {
    ComposedConstraint::from_systems(vec![ConstraintSystem::from(tightened(p, rel))])
}

/// Integer bound tightening: over all-integer variables, scale coefficient
/// denominators away and round the bound (`p < 0` becomes `p ≤ -1`).
/// Coefficient-gcd tightening is deliberately not performed.
fn tightened(p: Polynomial, rel: Relation) -> SingleConstraint {
    if p.is_constant() || !p.all_integer_vars() {
        return SingleConstraint::new(p, rel);
    }
    let lcm = BigRational::from_integer(p.coeff_denominator_lcm());
    let p = p.scale(&lcm);
    let c = p.constant_part().clone();
    match rel {
        Relation::Eq => {
            if c.is_integer() {
                SingleConstraint::new(p, Relation::Eq)
            } else {
                // Integer-valued left side can never meet a fractional bound.
                SingleConstraint::contradiction()
            }
        }
        Relation::Le => {
            let bound = (-&c).floor();
            let mut out = p;
            out.add_constant(&(-&bound - &c));
            SingleConstraint::new(out, Relation::Le)
        }
        Relation::Lt => {
            let b = -&c;
            let bound = if b.is_integer() {
                b - BigRational::one()
            } else {
                b.floor()
            };
            let mut out = p;
            out.add_constant(&(-&bound - &c));
            SingleConstraint::new(out, Relation::Le)
        }
    }
}

/// Replace subterms excluded from direct solving by fresh variables with
/// linear side constraints, bottom-up. Side constraints of substitutions
/// introduced here are appended to `sides`; cache hits add nothing.
fn eliminate(
    term: &Term,
    table: &mut SubstitutionTable,
    sides: &mut Vec<ComposedConstraint>,
) -> Result<Term, NormalizeError> {
    match term {
        Term::Constant(_) | Term::Variable(_) => Ok(term.clone()),
        Term::Sum(a, b) => Ok(Term::sum(
            eliminate(a, table, sides)?,
            eliminate(b, table, sides)?,
        )),
        Term::Product(a, b) => Ok(Term::product(
            eliminate(a, table, sides)?,
            eliminate(b, table, sides)?,
        )),
        Term::Quotient(a, b) => {
            let integral = term.check_types().map_err(NormalizeError::from)?.is_integer();
            let ea = eliminate(a, table, sides)?;
            let eb = eliminate(b, table, sides)?;
            if integral {
                truncating_division(ea, eb, table, sides, true)
            } else {
                Ok(Term::quotient(ea, eb))
            }
        }
        Term::Modulo(a, b) => {
            term.check_types().map_err(NormalizeError::from)?;
            let ea = eliminate(a, table, sides)?;
            let eb = eliminate(b, table, sides)?;
            truncating_division(ea, eb, table, sides, false)
        }
        Term::Cast(target, inner) => {
            let e = eliminate(inner, table, sides)?;
            let node = Term::cast(*target, e.clone());
            if node.as_constant().is_some() {
                return Ok(node);
            }
            let inner_ty = e.check_types().map_err(NormalizeError::from)?;
            if !(target.is_integer() && !inner_ty.is_integer()) {
                // Widening and integer-to-integer casts are numeric
                // identities for the solver; wrap-around is out of scope.
                return Ok(node);
            }
            if let Some(entry) = table.lookup(&node) {
                return Ok(Term::var(entry.variable.clone()));
            }
            let c = table.fresh_var("c", *target);
            let cv = Term::var(c.clone());
            // Truncation toward zero, split on the operand's sign.
            let nonneg = and3(
                rel_composed(Term::difference(cv.clone(), e.clone()), Relation::Le, table)?,
                rel_composed(
                    Term::difference(e.clone(), Term::sum(cv.clone(), Term::int(1))),
                    Relation::Lt,
                    table,
                )?,
                rel_composed(Term::neg(e.clone()), Relation::Le, table)?,
            )?;
            let nonpos = and3(
                rel_composed(Term::difference(e.clone(), cv.clone()), Relation::Le, table)?,
                rel_composed(
                    Term::difference(cv.clone(), Term::sum(e.clone(), Term::int(1))),
                    Relation::Lt,
                    table,
                )?,
                rel_composed(e.clone(), Relation::Le, table)?,
            )?;
            let side = nonneg.or(&nonpos);
            debug!(
                target: "pathsat::normalize",
                "substituted narrowing cast {} by {}", node, c
            );
            sides.push(side.clone());
            table.insert(node, c, side);
            Ok(cv)
        }
        Term::Shl(a, d) => {
            let ty = term.check_types().map_err(NormalizeError::from)?;
            let ea = eliminate(a, table, sides)?;
            let k = shift_distance(d, ty)?;
            Ok(Term::product(ea, power_of_two(k)))
        }
        Term::Shr(a, d) => {
            let ty = term.check_types().map_err(NormalizeError::from)?;
            let ea = eliminate(a, table, sides)?;
            let k = shift_distance(d, ty)?;
            let node = Term::shr(ea.clone(), Term::int(k as i32));
            if node.as_constant().is_some() {
                return Ok(node);
            }
            if let Some(entry) = table.lookup(&node) {
                return Ok(Term::var(entry.variable.clone()));
            }
            // Sign-propagating shift is floor division by 2^k:
            // 0 <= a - 2^k q <= 2^k - 1.
            let q = table.fresh_var("q", ty);
            let qv = Term::var(q.clone());
            let scaled = Term::product(power_of_two(k), qv.clone());
            let side = and_capped(
                &rel_composed(
                    Term::difference(scaled.clone(), ea.clone()),
                    Relation::Le,
                    table,
                )?,
                &rel_composed(
                    Term::difference(
                        ea.clone(),
                        Term::sum(scaled, power_of_two_minus_one(k)),
                    ),
                    Relation::Le,
                    table,
                )?,
            )?;
            sides.push(side.clone());
            table.insert(node, q.clone(), side);
            Ok(qv)
        }
        Term::BitAnd(_, _) | Term::BitOr(_, _) | Term::BitXor(_, _) => {
            term.check_types().map_err(NormalizeError::from)?;
            Err(NormalizeError::Unsupported(format!(
                "bitwise operator on symbolic operands: {}",
                term
            )))
        }
    }
}

fn and3(
    a: ComposedConstraint,
    b: ComposedConstraint,
    c: ComposedConstraint,
) -> Result<ComposedConstraint, NormalizeError> {
    and_capped(&and_capped(&a, &b)?, &c)
}

fn shift_distance(d: &Term, shifted: crate::constant::PrimitiveType) -> Result<u32, NormalizeError> {
    let mask = if shifted == crate::constant::PrimitiveType::Long {
        63
    } else {
        31
    };
    match d.as_constant() {
        Some(NumericConstant::Int(v)) => Ok((*v as i64 & mask) as u32),
        Some(NumericConstant::Long(v)) => Ok((*v & mask) as u32),
        _ => Err(NormalizeError::Unsupported(format!(
            "shift by non-constant distance: {}",
            d
        ))),
    }
}

fn power_of_two(k: u32) -> Term {
    Term::long(1i64 << k)
}

fn power_of_two_minus_one(k: u32) -> Term {
    Term::long((1i64 << k) - 1)
}

/// Substitute `a / b` (truncating, `quotient` true) or `a % b` by a fresh
/// variable. Requires a nonzero integer constant divisor; the quotient and
/// remainder are related by `a = q·b + m` with the remainder carrying the
/// dividend's sign.
fn truncating_division(
    a: Term,
    b: Term,
    table: &mut SubstitutionTable,
    sides: &mut Vec<ComposedConstraint>,
    quotient: bool,
) -> Result<Term, NormalizeError> {
    let node = if quotient {
        Term::quotient(a.clone(), b.clone())
    } else {
        Term::modulo(a.clone(), b.clone())
    };
    if node.as_constant().is_some() {
        return Ok(node);
    }
    let divisor = match b.as_constant() {
        Some(NumericConstant::Int(v)) => *v as i64,
        Some(NumericConstant::Long(v)) => *v,
        _ => {
            return Err(NormalizeError::Unsupported(format!(
                "{} with non-constant divisor",
                if quotient { "integer division" } else { "modulo" }
            )))
        }
    };
    if divisor == 0 {
        // Division by zero never completes normally; the arithmetic branch
        // is unsatisfiable.
        sides.push(ComposedConstraint::unsatisfiable());
        let ty = a.check_types().map_err(NormalizeError::from)?;
        return Ok(Term::var(table.fresh_var("z", ty)));
    }
    if let Some(entry) = table.lookup(&node) {
        return Ok(Term::var(entry.variable.clone()));
    }

    let ty = node.check_types().map_err(NormalizeError::from)?;
    let q = table.fresh_var("q", ty);
    let m = table.fresh_var("m", ty);
    let qv = Term::var(q.clone());
    let mv = Term::var(m.clone());
    let bound = divisor.abs() - 1;

    // a - q·b - m == 0
    let recompose = Term::difference(
        a.clone(),
        Term::sum(Term::product(b.clone(), qv.clone()), mv.clone()),
    );
    let eq = rel_composed(recompose, Relation::Eq, table)?;
    // a >= 0: 0 <= m <= |b| - 1
    let dividend_nonneg = and3(
        rel_composed(Term::neg(a.clone()), Relation::Le, table)?,
        rel_composed(Term::neg(mv.clone()), Relation::Le, table)?,
        rel_composed(
            Term::difference(mv.clone(), Term::long(bound)),
            Relation::Le,
            table,
        )?,
    )?;
    // a <= 0: -(|b| - 1) <= m <= 0
    let dividend_nonpos = and3(
        rel_composed(a, Relation::Le, table)?,
        rel_composed(mv.clone(), Relation::Le, table)?,
        rel_composed(
            Term::difference(Term::long(-bound), mv),
            Relation::Le,
            table,
        )?,
    )?;
    let side = and_capped(&eq, &dividend_nonneg.or(&dividend_nonpos))?;
    debug!(
        target: "pathsat::normalize",
        "substituted {} by {} with remainder {}", node, q, m
    );
    sides.push(side.clone());
    table.insert(node, if quotient { q.clone() } else { m.clone() }, side);
    Ok(if quotient { qv } else { Term::var(m) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::PrimitiveType;
    use crate::variable::NumericVariable;

    fn ivar(name: &str) -> Term {
        Term::var(NumericVariable::new(name, PrimitiveType::Int))
    }

    fn dvar(name: &str) -> Term {
        Term::var(NumericVariable::new(name, PrimitiveType::Double))
    }

    #[test]
    fn simple_comparison_is_one_system() {
        let mut table = SubstitutionTable::new();
        let e = ConstraintExpression::le(dvar("x"), Term::double(1.0));
        let c = normalize(&e, &mut table).unwrap();
        assert_eq!(c.systems().len(), 1);
        assert_eq!(c.systems()[0].constraints().len(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn disequality_splits_into_two_systems() {
        let mut table = SubstitutionTable::new();
        let e = ConstraintExpression::ne(dvar("x"), Term::double(3.0));
        let c = normalize(&e, &mut table).unwrap();
        assert_eq!(c.systems().len(), 2);
    }

    #[test]
    fn negation_pushes_onto_operators() {
        let mut table = SubstitutionTable::new();
        let e = ConstraintExpression::not(ConstraintExpression::gt(dvar("x"), Term::double(0.0)));
        let c = normalize(&e, &mut table).unwrap();
        // !(x > 0) is x <= 0: one weak constraint.
        assert_eq!(c.systems().len(), 1);
        let only = &c.systems()[0].constraints()[0];
        assert_eq!(only.relation(), Relation::Le);
    }

    #[test]
    fn integer_strict_bounds_tighten() {
        let mut table = SubstitutionTable::new();
        let e = ConstraintExpression::lt(ivar("x"), Term::int(1));
        let c = normalize(&e, &mut table).unwrap();
        let only = &c.systems()[0].constraints()[0];
        // x < 1 over integers becomes x <= 0.
        assert_eq!(only.relation(), Relation::Le);
        assert!(only.polynomial().constant_part().is_integer());
        assert_eq!(
            only.polynomial().constant_part(),
            &BigRational::from_integer(0.into())
        );
    }

    #[test]
    fn integer_equality_with_fractional_bound_is_unsat() {
        let mut table = SubstitutionTable::new();
        // x == -0.5 has no integer solution; tightening collapses it.
        let e = ConstraintExpression::eq(ivar("x"), Term::double(-0.5));
        let c = normalize(&e, &mut table).unwrap();
        assert!(c.is_unsatisfiable());
    }

    #[test]
    fn coefficient_divisibility_is_left_to_the_integer_layer() {
        let mut table = SubstitutionTable::new();
        // 2x == 1 is integer-infeasible, but only branch-and-bound decides
        // that; tightening performs no coefficient-gcd reasoning.
        let e = ConstraintExpression::eq(
            Term::product(Term::int(2), ivar("x")),
            Term::int(1),
        );
        let c = normalize(&e, &mut table).unwrap();
        assert!(!c.is_unsatisfiable());
    }

    #[test]
    fn real_division_by_variable_sign_splits() {
        let mut table = SubstitutionTable::new();
        // 1 / y <= 2 over reals.
        let e = ConstraintExpression::le(
            Term::quotient(Term::double(1.0), dvar("y")),
            Term::double(2.0),
        );
        let c = normalize(&e, &mut table).unwrap();
        assert!(!c.is_unsatisfiable());
        // Both denominator signs appear among the systems.
        assert!(c.systems().len() >= 2);
        assert!(table.is_empty());
    }

    #[test]
    fn modulo_introduces_cached_substitution() {
        let mut table = SubstitutionTable::new();
        let e1 = ConstraintExpression::eq(Term::modulo(ivar("x"), Term::int(3)), Term::int(1));
        let c1 = normalize(&e1, &mut table).unwrap();
        assert_eq!(table.len(), 1);
        assert!(!c1.is_unsatisfiable());

        // A structurally equal subterm reuses the same fresh variable.
        let e2 = ConstraintExpression::ge(Term::modulo(ivar("x"), Term::int(3)), Term::int(0));
        let c2 = normalize(&e2, &mut table).unwrap();
        assert_eq!(table.len(), 1);
        assert!(!c2.is_unsatisfiable());
    }

    #[test]
    fn narrowing_cast_substitutes_with_sign_split() {
        let mut table = SubstitutionTable::new();
        let cast = Term::cast(PrimitiveType::Int, dvar("d"));
        let e = ConstraintExpression::eq(cast, Term::int(2));
        let c = normalize(&e, &mut table).unwrap();
        assert_eq!(table.len(), 1);
        // Sign split of the operand survives into the DNF.
        assert!(c.systems().len() >= 2);
    }

    #[test]
    fn widening_cast_is_transparent() {
        let mut table = SubstitutionTable::new();
        let e = ConstraintExpression::le(
            Term::cast(PrimitiveType::Double, ivar("x")),
            Term::double(1.5),
        );
        let c = normalize(&e, &mut table).unwrap();
        assert!(table.is_empty());
        assert_eq!(c.systems().len(), 1);
    }

    #[test]
    fn shifts_linearize_by_constant_distance() {
        let mut table = SubstitutionTable::new();
        let e = ConstraintExpression::le(Term::shl(ivar("x"), Term::int(3)), Term::int(16));
        let c = normalize(&e, &mut table).unwrap();
        assert!(table.is_empty());
        assert_eq!(c.systems().len(), 1);

        let e = ConstraintExpression::ge(Term::shr(ivar("x"), Term::int(1)), Term::int(0));
        let c = normalize(&e, &mut table).unwrap();
        assert_eq!(table.len(), 1);
        assert!(!c.is_unsatisfiable());
    }

    #[test]
    fn unsupported_and_ill_typed_inputs_error() {
        let mut table = SubstitutionTable::new();
        let e = ConstraintExpression::eq(Term::bit_and(ivar("x"), ivar("y")), Term::int(0));
        assert!(matches!(
            normalize(&e, &mut table),
            Err(NormalizeError::Unsupported(_))
        ));

        let e = ConstraintExpression::eq(Term::modulo(ivar("x"), ivar("y")), Term::int(0));
        assert!(matches!(
            normalize(&e, &mut table),
            Err(NormalizeError::Unsupported(_))
        ));

        let e = ConstraintExpression::Type(crate::expr::TypeConstraint {
            reference: "r0".into(),
            classes: vec!["java/lang/Object".into()],
            positive: true,
        });
        assert!(matches!(
            normalize(&e, &mut table),
            Err(NormalizeError::TypeCheck(
                TypeCheckError::NonArithmeticConstraint(_)
            ))
        ));
    }

    #[test]
    fn boolean_constants_decide() {
        let mut table = SubstitutionTable::new();
        let t = normalize(&ConstraintExpression::Bool(true), &mut table).unwrap();
        assert!(t.is_trivially_true());
        let f = normalize(&ConstraintExpression::Bool(false), &mut table).unwrap();
        assert!(f.is_unsatisfiable());
    }
}
