//! Command abstractions.

use uuid::Uuid;

use crate::model::SeasonId;

/// Trait that all draft commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The season whose draft this command targets.
    fn season_id(&self) -> SeasonId;
}
