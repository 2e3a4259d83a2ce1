//! Pure draft rules. Nothing in here performs I/O.

pub mod actor;
pub mod commands;
pub mod ledger;
pub mod lifecycle;
pub mod roster;
pub mod settings;
pub mod turn_order;
pub mod watchlist;

use draftboard_core::error::DomainError;

/// Rejects non-positive identifiers.
///
/// # Errors
///
/// Returns `DomainError::Validation` naming the offending field.
pub fn ensure_positive_id(field: &str, id: i64) -> Result<(), DomainError> {
    if id <= 0 {
        return Err(DomainError::Validation(format!(
            "{field} must be a positive id, got {id}"
        )));
    }
    Ok(())
}
