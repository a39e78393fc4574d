//! Generalized modus ponens: from a premise `a` and an implication schema
//! `b`, unify `a` against `b`'s antecedent and return the instantiated
//! consequent.

use crate::expression::{Expression, LeafKind, Op, Term};
use crate::unify;

/// `a, a>b ⊢ b`. Returns `Expression::empty()` on any "no result" condition:
/// an empty input, `b` not rooted in `Implication`, or a failed
/// unification — never a `Result`, since these are local, silently-discarded
/// conditions, not propagating errors.
pub fn modus_ponens(a: &Expression, b: &Expression) -> Expression {
    if a.is_empty() || b.is_empty() {
        return Expression::empty();
    }
    if b.root_op() != Some(Op::Implication) {
        return Expression::empty();
    }

    let Some(antecedent_idx) = b.subtree(0).left else {
        return Expression::empty();
    };
    let antecedent = b.subtree_copy(antecedent_idx);

    let Some(substitution) = unify::unify(a, &antecedent) else {
        return Expression::empty();
    };

    let mut instance = b.clone();
    instance.change_variables(a.max_value() + 1);

    for var in instance.variables() {
        let Some(binding) = substitution.get(&var) else {
            continue;
        };
        let mut replacement = binding.clone();
        loop {
            let Some(Term::Leaf { kind: LeafKind::Variable, neg, id }) = replacement.term_at(0)
            else {
                break;
            };
            let Some(next) = substitution.get(&id) else {
                break;
            };
            let mut nxt = next.clone();
            if neg {
                nxt.negate();
            }
            replacement = nxt;
        }
        instance.replace(var, &replacement);
    }

    let Some(consequent_idx) = instance.subtree(0).right else {
        return Expression::empty();
    };
    let mut consequent = instance.subtree_copy(consequent_idx);
    consequent.normalize();
    consequent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;

    fn e(s: &str) -> Expression {
        Expression::new(s).expect("fixture parses")
    }

    #[test]
    fn derives_consequent_from_premise_and_implication() {
        let a = e("c"); // single premise, variable id 3
        let b = e("a>b"); // a(1)>b(2)
        let result = modus_ponens(&a, &b);
        assert!(!result.is_empty());
        // a unifies with c, so the consequent is b, instantiated to c's
        // counterpart; after normalize it is a single variable.
        let mut expected = Expression::new("x").expect("fixture parses");
        expected.normalize();
        let mut got = result.clone();
        got.normalize();
        assert!(got.equals(&expected, true));
    }

    #[test]
    fn empty_on_non_implication_rhs() {
        let a = e("a");
        let b = e("a*b");
        assert!(modus_ponens(&a, &b).is_empty());
    }

    #[test]
    fn empty_when_antecedent_shape_clashes() {
        // `a*b`'s root operator (Conjunction) can never unify with the
        // antecedent `(a>b)`'s root operator (Implication).
        let premise = e("a*b");
        let schema = e("(a>b)>c");
        assert!(modus_ponens(&premise, &schema).is_empty());
    }
}
