//! The flat, index-addressed expression tree and the structural operations
//! the rest of the crate builds on.

pub mod notation;
pub mod parser;
pub mod term;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

pub use notation::Notation;
pub use term::{LeafKind, Op, Relation, Term};

use crate::error::{ProverError, Result};

/// A sentential-logic formula, stored as a flat buffer of `(Term, Relation)`
/// pairs rather than a boxed tree of nodes. Index 0 is always the root when
/// the expression is non-empty.
#[derive(Debug, Clone)]
pub struct Expression {
    nodes: Vec<(Term, Relation)>,
    cache: RefCell<Option<String>>,
}

impl Expression {
    /// Parses the ascii surface syntax into an `Expression`.
    pub fn new(text: &str) -> Result<Expression> {
        parser::parse(text)
    }

    /// The empty expression: no nodes, prints as `"empty"`. Used as the
    /// "no result" sentinel by `inference::modus_ponens` and friends instead
    /// of an `Option` wrapper.
    pub fn empty() -> Expression {
        Expression { nodes: Vec::new(), cache: RefCell::new(None) }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A single leaf expression.
    pub fn from_term(term: Term) -> Expression {
        Expression {
            nodes: vec![(term, Relation::leaf(0, None))],
            cache: RefCell::new(None),
        }
    }

    /// `construct(lhs, op, rhs)`: builds `lhs op rhs` as a fresh tree, by
    /// concatenating copies of both operand buffers behind a new root.
    pub fn construct(lhs: &Expression, op: Op, rhs: &Expression) -> Expression {
        if lhs.is_empty() || rhs.is_empty() {
            return Expression::empty();
        }

        let mut nodes = Vec::with_capacity(1 + lhs.len() + rhs.len());
        let left_base = 1usize;
        let right_base = 1 + lhs.len();

        nodes.push((
            Term::Function { op },
            Relation::new(Some(0), Some(left_base), Some(right_base), None),
        ));

        for (term, rel) in &lhs.nodes {
            nodes.push((*term, shift_relation(rel, left_base, Some(0))));
        }
        for (term, rel) in &rhs.nodes {
            nodes.push((*term, shift_relation(rel, right_base, Some(0))));
        }

        Expression { nodes, cache: RefCell::new(None) }
    }

    fn dirty(&mut self) {
        *self.cache.borrow_mut() = None;
    }

    pub fn term_at(&self, idx: usize) -> Option<Term> {
        self.nodes.get(idx).map(|(t, _)| *t)
    }

    pub fn subtree(&self, idx: usize) -> Relation {
        self.nodes.get(idx).map(|(_, r)| *r).unwrap_or_default()
    }

    pub fn has_left(&self, idx: usize) -> bool {
        self.subtree(idx).left.is_some()
    }

    pub fn has_right(&self, idx: usize) -> bool {
        self.subtree(idx).right.is_some()
    }

    pub fn root_op(&self) -> Option<Op> {
        self.term_at(0).and_then(|t| t.op())
    }

    /// Count of `Term::Function` nodes carrying the given operator.
    pub fn operations(&self, op: Op) -> usize {
        self.nodes.iter().filter(|(t, _)| t.op() == Some(op)).count()
    }

    /// Multiset of variable ids appearing anywhere in the tree, in buffer
    /// order (not traversal order — callers that need first-occurrence
    /// order should use `normalize`'s in-order walk instead).
    pub fn variables(&self) -> Vec<i32> {
        self.nodes
            .iter()
            .filter_map(|(t, _)| if t.is_variable() { t.id() } else { None })
            .collect()
    }

    pub fn max_value(&self) -> i32 {
        self.variables().into_iter().max().unwrap_or(0)
    }

    pub fn min_value(&self) -> i32 {
        self.variables().into_iter().min().unwrap_or(i32::MAX)
    }

    /// Does the tree mention a leaf with this term's id? Matches the id
    /// across `Variable`/`Constant` kinds — used by the unifier's
    /// occurs-check, where the substitution's rhs could in principle mix
    /// variables and constants.
    pub fn contains(&self, term: &Term) -> bool {
        let Some(target) = term.id() else {
            return false;
        };
        if !term.is_variable() && !term.is_constant() {
            return false;
        }
        self.nodes
            .iter()
            .any(|(t, _)| (t.is_variable() || t.is_constant()) && t.id() == Some(target))
    }

    /// Renumbers every variable id to its first-occurrence rank (1, 2, 3...)
    /// under an in-order walk, so that alpha-equivalent schemas compare
    /// equal and print identically.
    pub fn normalize(&mut self) {
        if self.is_empty() {
            return;
        }
        let mut order = Vec::new();
        self.inorder_collect(0, &mut order);

        let mut remap = HashMap::new();
        let mut next = 1i32;
        for id in order {
            remap.entry(id).or_insert_with(|| {
                let assigned = next;
                next += 1;
                assigned
            });
        }

        for (term, _) in self.nodes.iter_mut() {
            if let Term::Leaf { kind: LeafKind::Variable, id, .. } = term {
                if let Some(&new_id) = remap.get(id) {
                    *id = new_id;
                }
            }
        }
        self.dirty();
    }

    fn inorder_collect(&self, idx: usize, order: &mut Vec<i32>) {
        let Some((term, rel)) = self.nodes.get(idx) else {
            return;
        };
        if let Some(l) = rel.left {
            self.inorder_collect(l, order);
        }
        if let Term::Leaf { kind: LeafKind::Variable, id, .. } = term {
            order.push(*id);
        }
        if let Some(r) = rel.right {
            self.inorder_collect(r, order);
        }
    }

    /// Shifts every variable id by `bound - min_value()`, so the lowest id
    /// present becomes exactly `bound`. Used by the unifier to give a
    /// freshly-instantiated schema variable ids disjoint from the ones
    /// already in play.
    pub fn change_variables(&mut self, bound: i32) {
        if self.is_empty() {
            return;
        }
        let offset = bound - self.min_value();
        for (term, _) in self.nodes.iter_mut() {
            if let Term::Leaf { kind: LeafKind::Variable, id, .. } = term {
                *id += offset;
            }
        }
        self.dirty();
    }

    /// Promotes every `Variable` leaf to a `Constant` leaf, in place. Used
    /// once a schema is accepted as a proved theorem: its variables become
    /// rigid so later unification can't re-bind them.
    pub fn make_permanent(&mut self) {
        for (term, _) in self.nodes.iter_mut() {
            if let Term::Leaf { kind, .. } = term {
                *kind = LeafKind::Constant;
            }
        }
        self.dirty();
    }

    /// An independent copy of the subtree rooted at `idx`, renumbered to
    /// its own zero-based buffer.
    pub fn subtree_copy(&self, idx: usize) -> Expression {
        if idx >= self.nodes.len() {
            return Expression::empty();
        }
        let mut order = Vec::new();
        self.collect_preorder(idx, &mut order);

        let mut remap = HashMap::new();
        for (new_idx, &old_idx) in order.iter().enumerate() {
            remap.insert(old_idx, new_idx);
        }

        let mut nodes = Vec::with_capacity(order.len());
        for &old_idx in &order {
            let (term, rel) = self.nodes[old_idx];
            nodes.push((
                term,
                Relation::new(
                    remap.get(&old_idx).copied(),
                    rel.left.and_then(|l| remap.get(&l).copied()),
                    rel.right.and_then(|r| remap.get(&r).copied()),
                    rel.parent.and_then(|p| remap.get(&p).copied()),
                ),
            ));
        }

        Expression { nodes, cache: RefCell::new(None) }
    }

    fn collect_preorder(&self, idx: usize, order: &mut Vec<usize>) {
        order.push(idx);
        let rel = self.subtree(idx);
        if let Some(l) = rel.left {
            self.collect_preorder(l, order);
        }
        if let Some(r) = rel.right {
            self.collect_preorder(r, order);
        }
    }

    /// Pushes negation through the node at `idx`, De Morgan-style. Branches
    /// on the operator's identity *before* `opposite()` reassigns it: since
    /// `opposite(Disjunction) == opposite(Implication) == Conjunction`,
    /// branching after reassignment would make a former `Disjunction`
    /// indistinguishable from a former `Implication`, and `Disjunction`
    /// needs genuine two-child De Morgan treatment while `Implication` only
    /// negates its right child. See DESIGN.md.
    pub fn negation(&mut self, idx: usize) {
        let Some((term, rel)) = self.nodes.get(idx).copied() else {
            return;
        };
        match term {
            Term::Leaf { .. } => {
                self.nodes[idx].0.deny();
            }
            Term::Function { op } => {
                self.nodes[idx].0 = Term::Function { op: op.opposite() };
                match op {
                    Op::Disjunction => {
                        if let Some(l) = rel.left {
                            self.negation(l);
                        }
                        if let Some(r) = rel.right {
                            self.negation(r);
                        }
                    }
                    Op::Conjunction | Op::Implication => {
                        if let Some(r) = rel.right {
                            self.negation(r);
                        }
                    }
                    Op::Xor | Op::Equivalent => {}
                }
            }
        }
        self.dirty();
    }

    pub fn negate(&mut self) {
        self.negation(0);
    }

    /// Rewrites every `Disjunction` node into `Implication` with its left
    /// child negated (`a|b ≡ !a>b`), eliminating `Disjunction` from the
    /// working fragment.
    pub fn standardize(&mut self) {
        if self.is_empty() {
            return;
        }
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(0usize);
        while let Some(idx) = queue.pop_front() {
            let Some((term, _)) = self.nodes.get(idx).copied() else {
                continue;
            };
            if let Term::Function { op: Op::Disjunction } = term {
                self.nodes[idx].0 = Term::Function { op: Op::Implication };
                if let Some(l) = self.subtree(idx).left {
                    self.negation(l);
                }
            }
            let rel = self.subtree(idx);
            if let Some(l) = rel.left {
                queue.push_back(l);
            }
            if let Some(r) = rel.right {
                queue.push_back(r);
            }
        }
        self.dirty();
    }

    /// Substitutes every `Variable` leaf with id `value` by a copy of
    /// `expr` (or of `!expr` where the occurrence itself was negated),
    /// fixing up parent pointers at each splice site after the index shift.
    pub fn replace(&mut self, value: i32, expr: &Expression) -> &mut Expression {
        if expr.is_empty() || self.is_empty() {
            return self;
        }

        let mut negated_copy = expr.clone();
        negated_copy.negation(0);

        let sites: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, (t, _))| {
                if t.is_variable() && t.id() == Some(value) {
                    Some(i)
                } else {
                    None
                }
            })
            .collect();

        if sites.is_empty() {
            return self;
        }

        let mut offset = self.nodes.len();
        for entry in sites {
            let site_negated = self.nodes[entry].0.is_negated();
            let replacement = if site_negated { &negated_copy } else { expr };

            let root_rel = replacement.subtree(0);
            let old_parent = self.nodes[entry].1.parent;
            let delta = offset - 1;
            self.nodes[entry] = (
                replacement.nodes[0].0,
                Relation::new(
                    Some(entry),
                    shift_index(root_rel.left, delta),
                    shift_index(root_rel.right, delta),
                    old_parent,
                ),
            );

            for (term, rel) in replacement.nodes.iter().skip(1) {
                self.nodes.push((
                    *term,
                    Relation::new(
                        shift_index(rel.self_, delta),
                        shift_index(rel.left, delta),
                        shift_index(rel.right, delta),
                        shift_index(rel.parent, delta),
                    ),
                ));
            }

            let entry_rel = self.nodes[entry].1;
            if let Some(l) = entry_rel.left {
                self.nodes[l].1.parent = Some(entry);
            }
            if let Some(r) = entry_rel.right {
                self.nodes[r].1.parent = Some(entry);
            }

            offset = self.nodes.len();
        }

        self.dirty();
        self
    }

    /// Structural equality. When `var_ignore` is set, two `Variable` leaves
    /// match regardless of id (but must still agree on negation);
    /// `Constant` leaves always compare ids exactly, and function nodes
    /// always compare operators exactly.
    pub fn equals(&self, other: &Expression, var_ignore: bool) -> bool {
        if self.nodes.len() != other.nodes.len() {
            return false;
        }
        self.nodes
            .iter()
            .zip(other.nodes.iter())
            .all(|((a, _), (b, _))| a.equals(b, var_ignore))
    }

    pub fn to_string_with(&self, notation: &Notation) -> String {
        if self.is_empty() {
            return "empty".to_string();
        }
        let mut out = String::new();
        self.render(0, notation, &mut out);
        out
    }

    fn render(&self, idx: usize, notation: &Notation, out: &mut String) {
        let Some((term, rel)) = self.nodes.get(idx) else {
            return;
        };
        let brackets = rel.parent.is_some() && term.is_function();
        if brackets {
            out.push('(');
        }
        if let Some(l) = rel.left {
            self.render(l, notation, out);
        }
        self.render_token(term, notation, out);
        if let Some(r) = rel.right {
            self.render(r, notation, out);
        }
        if brackets {
            out.push(')');
        }
    }

    fn render_token(&self, term: &Term, notation: &Notation, out: &mut String) {
        match term {
            Term::Function { op } => out.push_str(notation.op(*op)),
            Term::Leaf { kind, neg, id } => {
                if *neg {
                    out.push_str(notation.neg());
                }
                out.push_str(&leaf_letter(*kind, *id));
            }
        }
    }
}

/// Public wrapper around the variable-letter scheme, for reporting the
/// variable assignment a proved schema specializes to (`Solver::reconstruct`).
pub fn variable_label(id: i32) -> String {
    leaf_letter(LeafKind::Variable, id)
}

/// Maps a 1-based id to a letter (wrapping `a2`, `b2`, ... past `z`), and to
/// uppercase for constants. See DESIGN.md's "printing scheme for ids > 26".
fn leaf_letter(kind: LeafKind, id: i32) -> String {
    let zero_based = (id.max(1) - 1) as u32;
    let letter_idx = zero_based % 26;
    let generation = zero_based / 26;
    let base = match kind {
        LeafKind::Variable => b'a',
        LeafKind::Constant => b'A',
    };
    let letter = (base + letter_idx as u8) as char;
    if generation == 0 {
        letter.to_string()
    } else {
        format!("{letter}{generation}")
    }
}

fn shift_index(idx: Option<usize>, delta: usize) -> Option<usize> {
    idx.map(|i| i + delta)
}

fn shift_relation(rel: &Relation, base: usize, new_root_parent: Option<usize>) -> Relation {
    Relation::new(
        rel.self_.map(|i| i + base),
        rel.left.map(|i| i + base),
        rel.right.map(|i| i + base),
        match rel.parent {
            Some(p) => Some(p + base),
            None => new_root_parent,
        },
    )
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.cache.borrow().clone();
        if let Some(s) = cached {
            return f.write_str(&s);
        }
        let s = self.to_string_with(&Notation::default());
        *self.cache.borrow_mut() = Some(s.clone());
        f.write_str(&s)
    }
}

impl std::str::FromStr for Expression {
    type Err = ProverError;

    fn from_str(s: &str) -> Result<Expression> {
        Expression::new(s)
    }
}
