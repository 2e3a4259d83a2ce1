//! Translation of `sqlx` errors into domain errors.

use draftboard_core::error::DomainError;
use tracing::error;

pub(crate) const PICK_ITEM_CONSTRAINT: &str = "draft_picks_season_item_key";
pub(crate) const PICK_SLOT_CONSTRAINT: &str = "draft_picks_season_overall_key";
pub(crate) const POSITION_CONSTRAINT: &str = "draft_participants_season_position_key";

/// The violated unique constraint, if `err` is a unique violation.
fn violated_unique_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}

/// Maps a database failure to a `DomainError`. Ledger and seating
/// uniqueness violations become conflicts the caller can act on.
pub(crate) fn map_sqlx(err: sqlx::Error) -> DomainError {
    match violated_unique_constraint(&err) {
        Some(PICK_ITEM_CONSTRAINT) => {
            DomainError::Conflict("that item was just claimed by another team".to_owned())
        }
        Some(PICK_SLOT_CONSTRAINT) => {
            DomainError::Conflict("that pick slot was just filled by another request".to_owned())
        }
        Some(POSITION_CONSTRAINT) => DomainError::Conflict(
            "draft positions were changed by another request".to_owned(),
        ),
        _ => {
            error!(error = %err, "database operation failed");
            DomainError::Infrastructure(format!("database error: {err}"))
        }
    }
}

/// Maps an unparseable stored value to an infrastructure error.
pub(crate) fn corrupt_row(table: &str, err: &DomainError) -> DomainError {
    DomainError::Infrastructure(format!("corrupt {table} row: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_infrastructure() {
        let mapped = map_sqlx(sqlx::Error::RowNotFound);

        assert!(matches!(mapped, DomainError::Infrastructure(_)));
    }

    #[test]
    fn test_corrupt_row_names_the_table() {
        let cause = DomainError::Validation("unknown draft status: drafting".to_owned());

        match corrupt_row("draft_sessions", &cause) {
            DomainError::Infrastructure(msg) => {
                assert!(msg.contains("draft_sessions"));
                assert!(msg.contains("drafting"));
            }
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }
}
