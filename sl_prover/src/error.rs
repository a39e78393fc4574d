use thiserror::Error;

/// Everything that can go wrong building or running a prover.
///
/// A single crate-wide error enum, derived with `thiserror` rather than a
/// hand-written `Display` impl.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProverError {
    #[error("parse error at byte {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("solver requires at least 3 axioms, got {given}")]
    TooFewAxioms { given: usize },

    #[error("goal expression is empty")]
    EmptyGoal,
}

pub type Result<T> = std::result::Result<T, ProverError>;
