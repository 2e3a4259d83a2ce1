//! Draft store abstraction.
//!
//! The store is the only shared mutable resource of the engine. Every
//! check-then-write sequence runs inside one [`DraftTransaction`]; the store's
//! uniqueness constraints on `(season_id, item_id)` and
//! `(season_id, overall_pick_number)` arbitrate between transactions that both
//! pass their in-transaction checks. Implementations must surface a lost
//! uniqueness race as `DomainError::Conflict`, never as `Infrastructure`.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::model::{DraftSession, ItemId, NewPick, Participant, Pick, PickId, SeasonId, TeamId};

/// How a transaction reads the session row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLock {
    /// Shared with other pick placements, excludes lifecycle changes and undo.
    Shared,
    /// Excludes every other locking reader of the same session.
    Exclusive,
}

/// Lock-free reads of committed state plus the transaction entry point.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Returns the season's session, creating the default record if absent.
    async fn ensure_session(&self, season_id: SeasonId) -> Result<DraftSession, DomainError>;

    /// Participants ordered by ascending position.
    async fn participants(&self, season_id: SeasonId) -> Result<Vec<Participant>, DomainError>;

    /// The season's ledger ordered by ascending overall pick number.
    async fn picks(&self, season_id: SeasonId) -> Result<Vec<Pick>, DomainError>;

    /// A team's watchlist in insertion order.
    async fn watchlist(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
    ) -> Result<Vec<ItemId>, DomainError>;

    /// Opens a unit of work. Dropping it without [`DraftTransaction::commit`]
    /// rolls back every write.
    async fn begin(&self) -> Result<Box<dyn DraftTransaction>, DomainError>;
}

/// One atomic unit of work against the draft store.
#[async_trait]
pub trait DraftTransaction: Send {
    /// Re-reads (creating if absent) the session row under the given lock.
    async fn session(
        &mut self,
        season_id: SeasonId,
        lock: SessionLock,
    ) -> Result<DraftSession, DomainError>;

    /// Persists a changed session record.
    async fn save_session(&mut self, session: &DraftSession) -> Result<(), DomainError>;

    /// Participants ordered by ascending position.
    async fn participants(&mut self, season_id: SeasonId) -> Result<Vec<Participant>, DomainError>;

    /// Inserts participants not yet present; existing rows are left untouched.
    async fn insert_participants(&mut self, participants: &[Participant])
    -> Result<(), DomainError>;

    /// Reassigns positions so that `order[i]` sits at position `i + 1`.
    async fn assign_positions(
        &mut self,
        season_id: SeasonId,
        order: &[TeamId],
    ) -> Result<(), DomainError>;

    /// Sets a participant's ready flag.
    async fn set_ready(
        &mut self,
        season_id: SeasonId,
        team_id: TeamId,
        is_ready: bool,
    ) -> Result<(), DomainError>;

    /// The season's ledger ordered by ascending overall pick number.
    async fn picks(&mut self, season_id: SeasonId) -> Result<Vec<Pick>, DomainError>;

    /// Appends a ledger row.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` when the item or the overall pick slot
    /// is already taken in the season.
    async fn insert_pick(&mut self, pick: &NewPick) -> Result<Pick, DomainError>;

    /// Deletes one ledger row.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` when the row no longer exists.
    async fn delete_pick(&mut self, season_id: SeasonId, pick_id: PickId)
    -> Result<(), DomainError>;

    /// Clears a team's watchlist and reinserts `item_ids` in order.
    async fn replace_watchlist(
        &mut self,
        season_id: SeasonId,
        team_id: TeamId,
        item_ids: &[ItemId],
    ) -> Result<(), DomainError>;

    /// Commits every write made through this transaction.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` when a deferred constraint fails.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}
