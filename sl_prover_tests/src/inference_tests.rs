#![cfg(test)]

use sl_prover::inference::modus_ponens;
use sl_prover::Expression;

fn e(s: &str) -> Expression {
    Expression::new(s).expect("fixture parses")
}

#[test]
fn modus_ponens_derives_instantiated_consequent() {
    // Property 7: modus_ponens(a, a>b) normalizes to the instantiated
    // consequent. `a` here is the distinct premise `c`, `a>b` is the
    // schema `a>b` (ids 1, 2) — unifying `c` against `a` specializes `b`'s
    // counterpart to a fresh variable standing for `c` itself.
    let premise = e("c");
    let schema = e("a>b");
    let mut result = modus_ponens(&premise, &schema);
    assert!(!result.is_empty());
    result.normalize();

    let mut expected = e("x");
    expected.normalize();
    assert!(result.equals(&expected, true));
}

#[test]
fn modus_ponens_on_axiom_one_yields_nonempty_implication() {
    let premise = e("p");
    let schema = e("a>(b>a)");
    let mut result = modus_ponens(&premise, &schema);
    assert!(!result.is_empty());
    result.normalize();
    // The consequent `b>a` stays rooted in `Implication` after the
    // antecedent `a` is resolved against the premise.
    assert_eq!(result.root_op(), Some(sl_prover::expression::Op::Implication));
    let renormalized = result.to_string();
    result.normalize();
    assert_eq!(result.to_string(), renormalized);
}

#[test]
fn empty_on_empty_inputs() {
    assert!(modus_ponens(&Expression::empty(), &e("a>b")).is_empty());
    assert!(modus_ponens(&e("a"), &Expression::empty()).is_empty());
}

#[test]
fn empty_when_rhs_root_is_not_implication() {
    assert!(modus_ponens(&e("a"), &e("a*b")).is_empty());
}

#[test]
fn empty_when_unification_fails() {
    // `a*b`'s shape can never unify with `(a>b)`'s antecedent `a>b`.
    let premise = e("a*b");
    let schema = e("(a>b)>c");
    assert!(modus_ponens(&premise, &schema).is_empty());
}
