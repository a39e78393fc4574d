//! An automated theorem prover for propositional (Hilbert-style) logic.
//!
//! Given a goal formula, [`solver::Solver`] searches for a derivation from
//! three fixed axiom schemas using modus ponens, the deduction theorem, and
//! an implication-swap lemma. [`expression::Expression`] is the formula
//! representation everything else builds on; [`unify`] and [`inference`]
//! are the two lower layers the solver's saturation loop drives.

pub mod error;
pub mod expression;
pub mod inference;
pub mod solver;
pub mod unify;

pub use error::{ProverError, Result};
pub use expression::Expression;
pub use solver::{Outcome, ProofReport, Solver, SolverConfig};
