//! The unifier: treats `Variable` leaves on both sides as metavariables,
//! `Constant` leaves and `Function` nodes as rigid, and produces a
//! most-general substitution or fails. Uses `petgraph` for the
//! substitution-closure topological sort — an explicit graph + topo sort
//! catches every cycle in one linear pass, rather than repeated
//! dereference-with-visited-set bookkeeping.

use std::collections::{HashMap, VecDeque};

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use crate::expression::{Expression, LeafKind, Term};

/// A substitution produced by `unify`: variable id -> bound Expression.
/// Lives only for the duration of the call that requested it.
pub type Substitution = HashMap<i32, Expression>;

/// Unifies `right` against `left`. `right`'s variables are renamed above
/// `left`'s range first so the two schemas never collide. Returns `None` on
/// any failure mode: operator mismatch, constant mismatch, polarity
/// mismatch between equal variables, or an occurs-check violation.
pub fn unify(left: &Expression, right: &Expression) -> Option<Substitution> {
    if left.is_empty() || right.is_empty() {
        return None;
    }

    let mut right = right.clone();
    right.change_variables(left.max_value() + 1);
    let mut fresh = right.max_value() + 1;

    let mut sub: Substitution = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back((0usize, 0usize));

    while let Some((li, ri)) = queue.pop_front() {
        let left_term = left.term_at(li)?;
        let right_term = right.term_at(ri)?;

        // Both sides are rigid function nodes at this exact position —
        // recurse into children without copying.
        if let (Term::Function { op: lop }, Term::Function { op: rop }) = (left_term, right_term) {
            if lop != rop {
                return None;
            }
            let lrel = left.subtree(li);
            let rrel = right.subtree(ri);
            queue.push_back((lrel.left?, rrel.left?));
            queue.push_back((lrel.right?, rrel.right?));
            continue;
        }

        // Otherwise materialize both subtrees and chase any variable root
        // through the provisional substitution, accumulating negation.
        let lhs = deref(left.subtree_copy(li), &sub);
        let rhs = deref(right.subtree_copy(ri), &sub);

        let lt = lhs.term_at(0)?;
        let rt = rhs.term_at(0)?;

        match (lt, rt) {
            // Case 3: constant vs constant.
            (
                Term::Leaf { kind: LeafKind::Constant, .. },
                Term::Leaf { kind: LeafKind::Constant, .. },
            ) => {
                if !lt.equals(&rt, false) {
                    return None;
                }
            }
            // Case 4: constant vs variable (either order).
            (
                Term::Leaf { kind: LeafKind::Constant, .. },
                Term::Leaf { kind: LeafKind::Variable, neg, id },
            ) => {
                let mut bound = lhs;
                if neg {
                    bound.negate();
                }
                add_constraint(id, bound, &mut sub)?;
            }
            (
                Term::Leaf { kind: LeafKind::Variable, neg, id },
                Term::Leaf { kind: LeafKind::Constant, .. },
            ) => {
                let mut bound = rhs;
                if neg {
                    bound.negate();
                }
                add_constraint(id, bound, &mut sub)?;
            }
            // Case 5: variable vs variable.
            (
                Term::Leaf { kind: LeafKind::Variable, neg: ln, id: lid },
                Term::Leaf { kind: LeafKind::Variable, neg: rn, id: rid },
            ) => {
                if lid == rid {
                    if ln != rn {
                        return None;
                    }
                } else {
                    let new_id = fresh;
                    fresh += 1;
                    // Same polarity on both sides: the fresh variable is
                    // plain and both bindings agree on it. Differing
                    // polarity: the *negated* side binds to the plain
                    // variable and the *un-negated* side binds to its
                    // negation, so that re-negating either binding at its
                    // occurrence reproduces the other side's polarity.
                    let mut expr = Expression::from_term(Term::variable(new_id));
                    if ln || rn {
                        expr.negate();
                    }
                    let mut flipped = expr.clone();
                    flipped.negate();

                    add_constraint(lid, if ln { flipped.clone() } else { expr.clone() }, &mut sub)?;
                    add_constraint(rid, if rn { flipped } else { expr }, &mut sub)?;
                }
            }
            // Case 6: function vs variable (either order).
            (Term::Function { .. }, Term::Leaf { kind: LeafKind::Variable, neg, id }) => {
                let mut bound = lhs;
                if neg {
                    bound.negate();
                }
                add_constraint(id, bound, &mut sub)?;
            }
            (Term::Leaf { kind: LeafKind::Variable, neg, id }, Term::Function { .. }) => {
                let mut bound = rhs;
                if neg {
                    bound.negate();
                }
                add_constraint(id, bound, &mut sub)?;
            }
            // Function vs constant, or any other shape: fails.
            _ => return None,
        }
    }

    close_substitution(sub, fresh)
}

/// Chases a variable-rooted expression through `sub` until it lands on a
/// constant or function, negating at each hop its occurrence carried.
fn deref(mut expr: Expression, sub: &Substitution) -> Expression {
    loop {
        let Some(Term::Leaf { kind: LeafKind::Variable, neg, id }) = expr.term_at(0) else {
            return expr;
        };
        let Some(bound) = sub.get(&id) else {
            return expr;
        };
        let mut next = bound.clone();
        if neg {
            next.negate();
        }
        expr = next;
    }
}

/// Rejects a binding `x ↦ E` when `E` is function-rooted and mentions `x`:
/// the first layer of occurs-check.
fn add_constraint(var_id: i32, expr: Expression, sub: &mut Substitution) -> Option<()> {
    if expr.root_op().is_some() && expr.contains(&Term::variable(var_id)) {
        return None;
    }
    sub.insert(var_id, expr);
    Some(())
}

/// Closes the provisional substitution under composition: builds a graph
/// with an edge from every variable occurring in a binding to the variable
/// it's bound to, topologically sorts it (failing on a cycle), then chases
/// and splices function-rooted bindings in that order so the result is
/// fully resolved and acyclic.
fn close_substitution(mut sub: Substitution, fresh: i32) -> Option<Substitution> {
    let mut graph = DiGraph::<i32, ()>::new();
    let mut node_of = HashMap::with_capacity((fresh - 1).max(0) as usize);
    for var in 1..fresh {
        node_of.insert(var, graph.add_node(var));
    }
    for (&bound_var, expr) in sub.iter() {
        for occurring in expr.variables() {
            if let (Some(&from), Some(&to)) = (node_of.get(&occurring), node_of.get(&bound_var)) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let order = toposort(&graph, None).ok()?;

    for node_idx in order {
        let var = graph[node_idx];
        let Some(mut expr) = sub.remove(&var) else {
            continue;
        };
        if expr.root_op().is_none() {
            sub.insert(var, expr);
            continue;
        }

        for occurring in expr.variables() {
            let Some(binding) = sub.get(&occurring) else {
                continue;
            };
            let mut replacement = binding.clone();
            loop {
                let Some(Term::Leaf { kind: LeafKind::Variable, neg, id }) = replacement.term_at(0)
                else {
                    break;
                };
                let Some(next) = sub.get(&id) else {
                    break;
                };
                let mut nxt = next.clone();
                if neg {
                    nxt.negate();
                }
                replacement = nxt;
            }
            if replacement.contains(&Term::variable(occurring)) {
                return None;
            }
            expr.replace(occurring, &replacement);
        }
        sub.insert(var, expr);
    }

    Some(sub)
}
