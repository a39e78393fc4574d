//! The saturation loop's acceptance filter, kept as a tunable struct rather
//! than hard-coded constants so the one-conjunction / no-root-conjunction
//! policy can be adjusted without touching the solver.

use crate::expression::{Expression, Op};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicBounds {
    /// Candidates longer than this (node count) are rejected; also the
    /// solver's length bound `L` on expressions entering a wave at all.
    pub max_len: usize,
    /// Candidates with more than this many `Conjunction` nodes anywhere are
    /// rejected.
    pub max_conjunctions: usize,
    /// Candidates whose root operator is `Conjunction` are rejected.
    pub reject_root_conjunction: bool,
}

impl Default for HeuristicBounds {
    fn default() -> HeuristicBounds {
        HeuristicBounds { max_len: 20, max_conjunctions: 1, reject_root_conjunction: true }
    }
}

impl HeuristicBounds {
    pub fn accepts(&self, e: &Expression) -> bool {
        if e.is_empty() || e.len() > self.max_len {
            return false;
        }
        if self.reject_root_conjunction && e.root_op() == Some(Op::Conjunction) {
            return false;
        }
        e.operations(Op::Conjunction) <= self.max_conjunctions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;
    use test_case::test_case;

    #[test_case("a>b", true; "plain implication accepted")]
    #[test_case("a*b", false; "root conjunction rejected")]
    #[test_case("(a*b)>(c*d)", false; "two conjunctions rejected")]
    #[test_case("(a*b)>c", true; "single non-root conjunction accepted")]
    fn heuristic_accepts(input: &str, expected: bool) {
        let e = Expression::new(input).unwrap();
        assert_eq!(HeuristicBounds::default().accepts(&e), expected);
    }

    #[test]
    fn empty_expression_rejected() {
        assert!(!HeuristicBounds::default().accepts(&Expression::empty()));
    }
}
