//! Query handlers for the draft context.
//!
//! Read-only views over committed state. The lobby and state views also
//! seat roster teams that have not joined yet.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use draftboard_core::collaborators::{CatalogItem, PoolQuery};
use draftboard_core::error::DomainError;
use draftboard_core::model::{
    DraftSession, DraftStatus, ItemId, Participant, Pick, SeasonId, TeamId,
};
use serde::Serialize;

use super::DraftContext;
use super::command_handlers::sync_participants;
use crate::domain::actor::Actor;
use crate::domain::ledger;
use crate::domain::turn_order::{Turn, compute_turn};

/// Largest pool page a caller may request.
pub const MAX_POOL_PAGE_SIZE: u32 = 100;

/// A participant with its team name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantView {
    pub team_id: TeamId,
    pub team_name: String,
    pub position: i32,
    pub is_ready: bool,
}

/// The pre-draft lobby.
#[derive(Debug, Serialize)]
pub struct LobbyView {
    pub session: DraftSession,
    pub participants: Vec<ParticipantView>,
}

/// Live draft state.
#[derive(Debug, Serialize)]
pub struct StateView {
    pub session: DraftSession,
    pub participants: Vec<ParticipantView>,
    /// Present only while the draft is in progress or paused.
    pub current_turn: Option<Turn>,
    pub picks: Vec<Pick>,
    pub picks_made: usize,
    /// Whether the advisory round cap has been reached.
    pub rounds_complete: bool,
    pub last_pick_at: Option<DateTime<Utc>>,
}

/// A catalog item and the team that claimed it, if any.
#[derive(Debug, Clone, Serialize)]
pub struct PoolItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub claimed_by: Option<TeamId>,
}

/// One page of the draft pool.
#[derive(Debug, Serialize)]
pub struct PoolView {
    pub items: Vec<PoolItem>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// The caller's team: picks so far and watchlist.
#[derive(Debug, Serialize)]
pub struct MyDraftView {
    pub team_id: TeamId,
    pub picks: Vec<Pick>,
    pub watchlist: Vec<PoolItem>,
}

/// A pick as it appears in results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPick {
    pub overall_pick_number: i32,
    pub round: i32,
    pub pick_in_round: i32,
    pub item_id: ItemId,
    pub item_name: String,
}

/// One team's draft haul.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamResults {
    pub team_id: TeamId,
    pub team_name: String,
    pub position: i32,
    pub picks: Vec<ResultPick>,
}

/// Every team's picks, in draft position order.
#[derive(Debug, Serialize)]
pub struct ResultsView {
    pub status: DraftStatus,
    pub teams: Vec<TeamResults>,
}

async fn team_names(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
) -> Result<HashMap<TeamId, String>, DomainError> {
    Ok(ctx
        .directory
        .teams(season_id)
        .await?
        .into_iter()
        .map(|team| (team.team_id, team.name))
        .collect())
}

fn team_name(names: &HashMap<TeamId, String>, team_id: TeamId) -> String {
    names
        .get(&team_id)
        .cloned()
        .unwrap_or_else(|| format!("Team {team_id}"))
}

fn participant_views(
    participants: &[Participant],
    names: &HashMap<TeamId, String>,
) -> Vec<ParticipantView> {
    participants
        .iter()
        .map(|p| ParticipantView {
            team_id: p.team_id,
            team_name: team_name(names, p.team_id),
            position: p.position,
            is_ready: p.is_ready,
        })
        .collect()
}

/// Retrieves the lobby: session settings and seated participants.
///
/// # Errors
///
/// Returns `DomainError` if the store or directory fails.
pub async fn get_lobby(ctx: DraftContext<'_>, season_id: SeasonId) -> Result<LobbyView, DomainError> {
    let session = ctx.store.ensure_session(season_id).await?;
    let participants = sync_participants(ctx, season_id).await?;
    let names = team_names(ctx, season_id).await?;

    Ok(LobbyView {
        session,
        participants: participant_views(&participants, &names),
    })
}

/// Retrieves the live draft state with the current turn derived from the
/// ledger.
///
/// # Errors
///
/// Returns `DomainError` if the store or directory fails.
pub async fn get_state(ctx: DraftContext<'_>, season_id: SeasonId) -> Result<StateView, DomainError> {
    let session = ctx.store.ensure_session(season_id).await?;
    let participants = sync_participants(ctx, season_id).await?;
    let picks = ctx.store.picks(season_id).await?;
    let names = team_names(ctx, season_id).await?;

    let current_turn = matches!(session.status, DraftStatus::InProgress | DraftStatus::Paused)
        .then(|| compute_turn(session.ordering_mode, &participants, picks.len()));

    Ok(StateView {
        current_turn,
        rounds_complete: ledger::rounds_complete(&session, participants.len(), picks.len()),
        last_pick_at: ledger::last_pick(&picks).map(|pick| pick.created_at),
        picks_made: picks.len(),
        participants: participant_views(&participants, &names),
        session,
        picks,
    })
}

/// Retrieves one page of the catalog with each item's claim marked.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a page below 1 or a page size
/// outside `1..=MAX_POOL_PAGE_SIZE`.
pub async fn get_pool(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
    query: &PoolQuery,
) -> Result<PoolView, DomainError> {
    if query.page == 0 {
        return Err(DomainError::Validation("page must be at least 1".to_owned()));
    }
    if !(1..=MAX_POOL_PAGE_SIZE).contains(&query.page_size) {
        return Err(DomainError::Validation(format!(
            "page_size must be between 1 and {MAX_POOL_PAGE_SIZE}, got {}",
            query.page_size
        )));
    }

    let page = ctx.catalog.browse(season_id, query).await?;
    let claims = ledger::claims(&ctx.store.picks(season_id).await?);

    Ok(PoolView {
        items: page
            .items
            .into_iter()
            .map(|item| PoolItem {
                claimed_by: claims.get(&item.item_id).copied(),
                item,
            })
            .collect(),
        page: query.page,
        page_size: query.page_size,
        total: page.total,
    })
}

/// Retrieves the caller's picks and watchlist.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` when the caller manages no team.
pub async fn get_my_draft(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
    actor: &Actor,
) -> Result<MyDraftView, DomainError> {
    let team_id = actor.require_team()?;
    let picks = ctx.store.picks(season_id).await?;
    let watchlist = ctx.store.watchlist(season_id, team_id).await?;
    let claims = ledger::claims(&picks);

    let mut items: HashMap<ItemId, CatalogItem> = ctx
        .catalog
        .items(season_id, &watchlist)
        .await?
        .into_iter()
        .map(|item| (item.item_id, item))
        .collect();

    Ok(MyDraftView {
        team_id,
        picks: ledger::picks_for_team(&picks, team_id),
        watchlist: watchlist
            .iter()
            .filter_map(|item_id| items.remove(item_id))
            .map(|item| PoolItem {
                claimed_by: claims.get(&item.item_id).copied(),
                item,
            })
            .collect(),
    })
}

/// Retrieves every participant's picks in draft position order.
///
/// # Errors
///
/// Returns `DomainError` if the store, catalog or directory fails.
pub async fn get_results(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
) -> Result<ResultsView, DomainError> {
    let session = ctx.store.ensure_session(season_id).await?;
    let participants = ctx.store.participants(season_id).await?;
    let picks = ctx.store.picks(season_id).await?;
    let names = team_names(ctx, season_id).await?;

    let item_ids: Vec<ItemId> = picks.iter().map(|pick| pick.item_id).collect();
    let item_names: HashMap<ItemId, String> = ctx
        .catalog
        .items(season_id, &item_ids)
        .await?
        .into_iter()
        .map(|item| (item.item_id, item.name))
        .collect();

    let teams = participants
        .iter()
        .map(|participant| TeamResults {
            team_id: participant.team_id,
            team_name: team_name(&names, participant.team_id),
            position: participant.position,
            picks: ledger::picks_for_team(&picks, participant.team_id)
                .into_iter()
                .map(|pick| ResultPick {
                    overall_pick_number: pick.overall_pick_number,
                    round: pick.round,
                    pick_in_round: pick.pick_in_round,
                    item_id: pick.item_id,
                    item_name: item_names
                        .get(&pick.item_id)
                        .cloned()
                        .unwrap_or_else(|| format!("Item {}", pick.item_id)),
                })
                .collect(),
        })
        .collect();

    Ok(ResultsView {
        status: session.status,
        teams,
    })
}

/// Retrieves one participant's picks.
///
/// # Errors
///
/// Returns `DomainError::NotFound` when the team is not in the draft.
pub async fn get_team_results(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
    team_id: TeamId,
) -> Result<TeamResults, DomainError> {
    get_results(ctx, season_id)
        .await?
        .teams
        .into_iter()
        .find(|team| team.team_id == team_id)
        .ok_or_else(|| DomainError::not_found("team", team_id))
}
