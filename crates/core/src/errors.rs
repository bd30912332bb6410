use thiserror::Error;

/// Violations of domain-record invariants, raised at construction time by
/// the collaborators that own the records. The analyzers themselves are
/// infallible: insufficient data is expressed through result shapes, never
/// through errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}
