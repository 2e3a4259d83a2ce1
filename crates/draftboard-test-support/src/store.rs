//! Test stores: in-memory and failing `DraftStore` implementations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use draftboard_core::error::DomainError;
use draftboard_core::model::{
    DraftSession, ItemId, NewPick, Participant, Pick, PickId, SeasonId, TeamId,
};
use draftboard_core::repository::{DraftStore, DraftTransaction, SessionLock};

#[derive(Debug, Default, Clone)]
struct Tables {
    sessions: BTreeMap<SeasonId, DraftSession>,
    participants: BTreeMap<(SeasonId, TeamId), Participant>,
    picks: Vec<Pick>,
    watchlists: BTreeMap<(SeasonId, TeamId), Vec<ItemId>>,
}

#[derive(Debug, Clone)]
enum Write {
    SaveSession(DraftSession),
    InsertParticipants(Vec<Participant>),
    AssignPositions(SeasonId, Vec<TeamId>),
    SetReady(SeasonId, TeamId, bool),
    InsertPick(Pick),
    DeletePick(SeasonId, PickId),
    ReplaceWatchlist(SeasonId, TeamId, Vec<ItemId>),
}

impl Tables {
    fn session(&self, season_id: SeasonId) -> DraftSession {
        self.sessions
            .get(&season_id)
            .cloned()
            .unwrap_or_else(|| DraftSession::new(season_id))
    }

    fn participants(&self, season_id: SeasonId) -> Vec<Participant> {
        let mut rows: Vec<Participant> = self
            .participants
            .values()
            .filter(|p| p.season_id == season_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.position);
        rows
    }

    fn picks(&self, season_id: SeasonId) -> Vec<Pick> {
        let mut rows: Vec<Pick> = self
            .picks
            .iter()
            .filter(|p| p.season_id == season_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.overall_pick_number);
        rows
    }

    /// Applies one write, enforcing the immediate uniqueness constraints.
    fn apply(&mut self, write: &Write) -> Result<(), DomainError> {
        match write {
            Write::SaveSession(session) => {
                self.sessions.insert(session.season_id, session.clone());
            }
            Write::InsertParticipants(rows) => {
                for row in rows {
                    self.participants
                        .entry((row.season_id, row.team_id))
                        .or_insert_with(|| row.clone());
                }
            }
            Write::AssignPositions(season_id, order) => {
                for (index, team_id) in order.iter().enumerate() {
                    let row = self
                        .participants
                        .get_mut(&(*season_id, *team_id))
                        .ok_or_else(|| DomainError::not_found("participant", *team_id))?;
                    row.position = i32::try_from(index + 1).unwrap_or(i32::MAX);
                }
            }
            Write::SetReady(season_id, team_id, is_ready) => {
                let row = self
                    .participants
                    .get_mut(&(*season_id, *team_id))
                    .ok_or_else(|| DomainError::not_found("participant", *team_id))?;
                row.is_ready = *is_ready;
            }
            Write::InsertPick(pick) => {
                let same_season = self.picks.iter().filter(|p| p.season_id == pick.season_id);
                for existing in same_season {
                    if existing.item_id == pick.item_id {
                        return Err(DomainError::Conflict(format!(
                            "item {} was just claimed by another team",
                            pick.item_id
                        )));
                    }
                    if existing.overall_pick_number == pick.overall_pick_number {
                        return Err(DomainError::Conflict(format!(
                            "pick slot {} was just filled by another request",
                            pick.overall_pick_number
                        )));
                    }
                }
                self.picks.push(pick.clone());
            }
            Write::DeletePick(season_id, pick_id) => {
                let index = self
                    .picks
                    .iter()
                    .position(|p| p.season_id == *season_id && p.id == *pick_id)
                    .ok_or_else(|| {
                        DomainError::Conflict(format!("pick {pick_id} was already undone"))
                    })?;
                self.picks.remove(index);
            }
            Write::ReplaceWatchlist(season_id, team_id, item_ids) => {
                self.watchlists
                    .insert((*season_id, *team_id), item_ids.clone());
            }
        }
        Ok(())
    }

    /// Deferred constraint: positions are unique within a season.
    fn check_positions(&self) -> Result<(), DomainError> {
        let mut seen = BTreeMap::new();
        for row in self.participants.values() {
            if let Some(other) = seen.insert((row.season_id, row.position), row.team_id) {
                return Err(DomainError::Conflict(format!(
                    "teams {other} and {} both hold position {}",
                    row.team_id, row.position
                )));
            }
        }
        Ok(())
    }
}

/// An in-memory draft store with read-committed visibility.
///
/// Each transaction reads the latest committed tables overlaid with its own
/// staged writes. Uniqueness is checked when a write is staged and again when
/// the transaction commits, so two transactions that both pass their checks
/// race exactly as they would against a relational store: the first commit
/// wins and the second fails with `DomainError::Conflict`. Reading picks and
/// inserting a pick yield to the runtime, so placements joined on one task
/// interleave between their checks and their commits. Row locks are not
/// modelled.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDraftStore {
    tables: Arc<Mutex<Tables>>,
    next_pick_id: Arc<AtomicI64>,
}

impl InMemoryDraftStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a session record.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_session(self, session: DraftSession) -> Self {
        self.tables
            .lock()
            .unwrap()
            .sessions
            .insert(session.season_id, session);
        self
    }

    /// Seeds participants so that `team_ids[i]` sits at position `i + 1`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_participants(self, season_id: SeasonId, team_ids: &[TeamId]) -> Self {
        {
            let mut tables = self.tables.lock().unwrap();
            for (index, team_id) in team_ids.iter().enumerate() {
                tables.participants.insert(
                    (season_id, *team_id),
                    Participant {
                        season_id,
                        team_id: *team_id,
                        position: i32::try_from(index + 1).unwrap(),
                        is_ready: false,
                    },
                );
            }
        }
        self
    }

    /// Seeds committed ledger rows.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_picks(self, picks: Vec<NewPick>) -> Self {
        {
            let mut tables = self.tables.lock().unwrap();
            for pick in picks {
                let id = self.next_pick_id.fetch_add(1, Ordering::SeqCst) + 1;
                tables.picks.push(pick.into_pick(id));
            }
        }
        self
    }

    /// Committed session, if one was ever created.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn committed_session(&self, season_id: SeasonId) -> Option<DraftSession> {
        self.tables.lock().unwrap().sessions.get(&season_id).cloned()
    }

    /// Committed participants ordered by position.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn committed_participants(&self, season_id: SeasonId) -> Vec<Participant> {
        self.tables.lock().unwrap().participants(season_id)
    }

    /// Committed ledger ordered by overall pick number.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn committed_picks(&self, season_id: SeasonId) -> Vec<Pick> {
        self.tables.lock().unwrap().picks(season_id)
    }

    /// Committed watchlist.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn committed_watchlist(&self, season_id: SeasonId, team_id: TeamId) -> Vec<ItemId> {
        self.tables
            .lock()
            .unwrap()
            .watchlists
            .get(&(season_id, team_id))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn ensure_session(&self, season_id: SeasonId) -> Result<DraftSession, DomainError> {
        let mut tables = self.tables.lock().unwrap();
        let session = tables
            .sessions
            .entry(season_id)
            .or_insert_with(|| DraftSession::new(season_id));
        Ok(session.clone())
    }

    async fn participants(&self, season_id: SeasonId) -> Result<Vec<Participant>, DomainError> {
        Ok(self.committed_participants(season_id))
    }

    async fn picks(&self, season_id: SeasonId) -> Result<Vec<Pick>, DomainError> {
        Ok(self.committed_picks(season_id))
    }

    async fn watchlist(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
    ) -> Result<Vec<ItemId>, DomainError> {
        Ok(self.committed_watchlist(season_id, team_id))
    }

    async fn begin(&self) -> Result<Box<dyn DraftTransaction>, DomainError> {
        Ok(Box::new(InMemoryTransaction {
            tables: Arc::clone(&self.tables),
            next_pick_id: Arc::clone(&self.next_pick_id),
            staged: Vec::new(),
        }))
    }
}

/// A unit of work against [`InMemoryDraftStore`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    tables: Arc<Mutex<Tables>>,
    next_pick_id: Arc<AtomicI64>,
    staged: Vec<Write>,
}

impl InMemoryTransaction {
    fn view(&self) -> Result<Tables, DomainError> {
        let mut tables = self.tables.lock().unwrap().clone();
        for write in &self.staged {
            tables.apply(write)?;
        }
        Ok(tables)
    }

    fn stage(&mut self, write: Write) -> Result<(), DomainError> {
        let mut view = self.view()?;
        view.apply(&write)?;
        self.staged.push(write);
        Ok(())
    }
}

#[async_trait]
impl DraftTransaction for InMemoryTransaction {
    async fn session(
        &mut self,
        season_id: SeasonId,
        _lock: SessionLock,
    ) -> Result<DraftSession, DomainError> {
        Ok(self.view()?.session(season_id))
    }

    async fn save_session(&mut self, session: &DraftSession) -> Result<(), DomainError> {
        self.stage(Write::SaveSession(session.clone()))
    }

    async fn participants(&mut self, season_id: SeasonId) -> Result<Vec<Participant>, DomainError> {
        Ok(self.view()?.participants(season_id))
    }

    async fn insert_participants(
        &mut self,
        participants: &[Participant],
    ) -> Result<(), DomainError> {
        self.stage(Write::InsertParticipants(participants.to_vec()))
    }

    async fn assign_positions(
        &mut self,
        season_id: SeasonId,
        order: &[TeamId],
    ) -> Result<(), DomainError> {
        self.stage(Write::AssignPositions(season_id, order.to_vec()))
    }

    async fn set_ready(
        &mut self,
        season_id: SeasonId,
        team_id: TeamId,
        is_ready: bool,
    ) -> Result<(), DomainError> {
        self.stage(Write::SetReady(season_id, team_id, is_ready))
    }

    async fn picks(&mut self, season_id: SeasonId) -> Result<Vec<Pick>, DomainError> {
        let rows = self.view()?.picks(season_id);
        // Let a concurrent transaction read the same ledger before this one acts on it.
        tokio::task::yield_now().await;
        Ok(rows)
    }

    async fn insert_pick(&mut self, pick: &NewPick) -> Result<Pick, DomainError> {
        let id = self.next_pick_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = pick.clone().into_pick(id);
        self.stage(Write::InsertPick(row.clone()))?;
        tokio::task::yield_now().await;
        Ok(row)
    }

    async fn delete_pick(
        &mut self,
        season_id: SeasonId,
        pick_id: PickId,
    ) -> Result<(), DomainError> {
        self.stage(Write::DeletePick(season_id, pick_id))
    }

    async fn replace_watchlist(
        &mut self,
        season_id: SeasonId,
        team_id: TeamId,
        item_ids: &[ItemId],
    ) -> Result<(), DomainError> {
        self.stage(Write::ReplaceWatchlist(season_id, team_id, item_ids.to_vec()))
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let mut tables = self.tables.lock().unwrap();
        let mut next = tables.clone();
        for write in &self.staged {
            next.apply(write)?;
        }
        next.check_positions()?;
        *tables = next;
        Ok(())
    }
}

/// A draft store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingDraftStore;

fn connection_refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

#[async_trait]
impl DraftStore for FailingDraftStore {
    async fn ensure_session(&self, _season_id: SeasonId) -> Result<DraftSession, DomainError> {
        Err(connection_refused())
    }

    async fn participants(&self, _season_id: SeasonId) -> Result<Vec<Participant>, DomainError> {
        Err(connection_refused())
    }

    async fn picks(&self, _season_id: SeasonId) -> Result<Vec<Pick>, DomainError> {
        Err(connection_refused())
    }

    async fn watchlist(
        &self,
        _season_id: SeasonId,
        _team_id: TeamId,
    ) -> Result<Vec<ItemId>, DomainError> {
        Err(connection_refused())
    }

    async fn begin(&self) -> Result<Box<dyn DraftTransaction>, DomainError> {
        Err(connection_refused())
    }
}
