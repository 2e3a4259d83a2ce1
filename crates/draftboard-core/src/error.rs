//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Every guard in the draft engine fails with one of these kinds; storage
/// adapters translate their own failures into `Conflict` (lost uniqueness
/// races) or `Infrastructure` (everything else).
#[derive(Debug, Error)]
pub enum DomainError {
    /// A season, team, participant or item does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: &'static str,
        /// The identifier that was not found.
        id: i64,
    },

    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller lacks the role required for the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A domain precondition failed.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Returns `true` for the `Conflict` kind.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
