//! The pick placement protocol.
//!
//! Every check re-reads state inside the placement transaction. The store's
//! uniqueness constraints on `(season, item)` and `(season, overall pick)`
//! settle races between two transactions that both pass the checks; the
//! loser surfaces as `DomainError::Conflict`.

use draftboard_core::error::DomainError;
use draftboard_core::model::{ItemId, NewPick, Pick, SeasonId, TeamId};
use draftboard_core::repository::SessionLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::DraftContext;
use crate::domain::ledger;
use crate::domain::lifecycle::ensure_accepting_picks;
use crate::domain::turn_order::compute_turn;

/// A claim on an item for the team on the clock.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlacementRequest {
    pub correlation_id: Uuid,
    pub season_id: SeasonId,
    pub item_id: ItemId,
    /// Team the caller manages, if any.
    pub requesting_team: Option<TeamId>,
    /// Commissioners skip the turn-ownership check.
    pub is_commissioner: bool,
    /// Commissioner assertion of who is on the clock.
    pub forced_team: Option<TeamId>,
}

pub(crate) async fn place_pick(
    ctx: DraftContext<'_>,
    request: &PlacementRequest,
) -> Result<Pick, DomainError> {
    let season_id = request.season_id;
    let item_id = request.item_id;
    let mut tx = ctx.store.begin().await?;

    let session = tx.session(season_id, SessionLock::Shared).await?;
    ensure_accepting_picks(&session)?;

    let participants = tx.participants(season_id).await?;
    let picks = tx.picks(season_id).await?;

    if ledger::claimed_by(&picks, item_id).is_some() {
        return Err(DomainError::Conflict(format!(
            "item {item_id} is already drafted"
        )));
    }

    let turn = compute_turn(session.ordering_mode, &participants, picks.len());
    let expected_team = turn.team_id.ok_or_else(|| {
        DomainError::Conflict("draft has no participants to pick".to_owned())
    })?;

    if !request.is_commissioner && request.requesting_team != Some(expected_team) {
        return Err(DomainError::Forbidden("it is not your turn".to_owned()));
    }
    if request.is_commissioner
        && let Some(forced) = request.forced_team
        && forced != expected_team
    {
        return Err(DomainError::Conflict(format!(
            "team {forced} is not on the clock, team {expected_team} is"
        )));
    }

    let item = ctx
        .catalog
        .item(season_id, item_id)
        .await?
        .ok_or_else(|| DomainError::not_found("item", item_id))?;
    if !item.is_draftable() {
        return Err(DomainError::Conflict(format!(
            "{} is not draftable",
            item.name
        )));
    }
    if item.banned {
        return Err(DomainError::Conflict(format!(
            "{} is banned this season",
            item.name
        )));
    }

    let new_pick = NewPick {
        season_id,
        round: turn.round,
        pick_in_round: turn.pick_in_round,
        overall_pick_number: turn.overall_pick_number,
        team_id: expected_team,
        item_id,
        created_at: ctx.clock.now(),
    };
    // Uniqueness may be enforced on insert or only at commit.
    let pick = match tx.insert_pick(&new_pick).await {
        Ok(pick) => tx.commit().await.map(|()| pick),
        Err(e) => Err(e),
    }
    .inspect_err(|e| {
        if e.is_conflict() {
            warn!(
                correlation_id = %request.correlation_id,
                season_id,
                item_id,
                overall_pick_number = new_pick.overall_pick_number,
                error = %e,
                "pick lost a placement race"
            );
        }
    })?;

    info!(
        correlation_id = %request.correlation_id,
        season_id,
        team_id = pick.team_id,
        item_id,
        overall_pick_number = pick.overall_pick_number,
        by_commissioner = request.is_commissioner,
        "pick placed"
    );
    Ok(pick)
}
