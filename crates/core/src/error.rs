//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of the mutation model
/// (malformed operations, removals that match nothing). Storage and
/// concurrency concerns belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A caller-supplied operation failed validation (e.g. empty ARN).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A removal was requested but zero bindings matched.
    ///
    /// Distinct from success: callers must be able to tell "nothing to do"
    /// apart from "removed".
    #[error("no matching binding: {0}")]
    NoMatch(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn no_match(msg: impl Into<String>) -> Self {
        Self::NoMatch(msg.into())
    }
}
