//! Command handlers for the draft context.
//!
//! Each handler checks the actor's role, then performs its reads, checks and
//! writes inside one store transaction. A handler that returns early drops
//! the transaction, which rolls it back.

use std::sync::Mutex;

use draftboard_core::collaborators::PoolQuery;
use draftboard_core::error::DomainError;
use draftboard_core::model::{DraftSession, ItemId, Participant, Pick, SeasonId, TeamId};
use draftboard_core::repository::{DraftTransaction, SessionLock};
use draftboard_core::rng::DeterministicRng;
use tracing::info;
use uuid::Uuid;

use super::DraftContext;
use super::placement::{PlacementRequest, place_pick};
use crate::domain::commands::{
    AdvanceDraft, EndDraft, ForcePick, PauseDraft, ReorderParticipants, RerollOrder, ResumeDraft,
    StartDraft, SubmitPick, ToggleReady, UndoLastPick, UpdateSettings, UpdateWatchlist,
};
use crate::domain::actor::Actor;
use crate::domain::ensure_positive_id;
use crate::domain::ledger;
use crate::domain::lifecycle::{
    Transition, TransitionOutcome, ensure_accepting_picks, ensure_rules_mutable,
    status_after_ready, transition,
};
use crate::domain::roster::{plan_new_participants, shuffle_order, validate_manual_order};
use crate::domain::turn_order::compute_turn;
use crate::domain::watchlist::normalize_watchlist;

/// Catalog page size used by the auto-pick scan.
pub const AUTO_PICK_PAGE_SIZE: u32 = 100;

/// Maximum catalog pages the auto-pick scan reads before giving up.
pub const AUTO_PICK_MAX_PAGES: u32 = 20;

/// Seats roster teams that are not yet participants, inside `tx`.
async fn seat_new_teams(
    ctx: DraftContext<'_>,
    tx: &mut dyn DraftTransaction,
    season_id: SeasonId,
) -> Result<Vec<Participant>, DomainError> {
    let roster: Vec<TeamId> = ctx
        .directory
        .teams(season_id)
        .await?
        .iter()
        .map(|team| team.team_id)
        .collect();
    let existing = tx.participants(season_id).await?;
    let planned = plan_new_participants(season_id, &existing, &roster);
    if planned.is_empty() {
        return Ok(existing);
    }
    tx.insert_participants(&planned).await?;
    info!(season_id, seated = planned.len(), "participants joined the draft");
    tx.participants(season_id).await
}

/// Brings the participant list up to date with the season roster. Returns
/// participants ordered by position.
///
/// The common case, where nobody new has joined, reads without locking.
///
/// # Errors
///
/// Returns `DomainError` if the directory or store fails.
pub async fn sync_participants(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
) -> Result<Vec<Participant>, DomainError> {
    let roster: Vec<TeamId> = ctx
        .directory
        .teams(season_id)
        .await?
        .iter()
        .map(|team| team.team_id)
        .collect();
    let existing = ctx.store.participants(season_id).await?;
    if plan_new_participants(season_id, &existing, &roster).is_empty() {
        return Ok(existing);
    }

    let mut tx = ctx.store.begin().await?;
    tx.session(season_id, SessionLock::Exclusive).await?;
    let participants = seat_new_teams(ctx, tx.as_mut(), season_id).await?;
    tx.commit().await?;
    Ok(participants)
}

/// Handles the `SubmitPick` command: places a pick for the caller's team.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` when the caller manages no team or it is
/// not their turn, `DomainError::Conflict` when the draft is not running or
/// the item is taken, and `DomainError::NotFound` for unknown items.
pub async fn handle_submit_pick(
    command: &SubmitPick,
    ctx: DraftContext<'_>,
) -> Result<Pick, DomainError> {
    ensure_positive_id("item_id", command.item_id)?;
    if !command.actor.is_commissioner {
        command.actor.require_team()?;
    }

    place_pick(
        ctx,
        &PlacementRequest {
            correlation_id: command.correlation_id,
            season_id: command.season_id,
            item_id: command.item_id,
            requesting_team: command.actor.team_id,
            is_commissioner: command.actor.is_commissioner,
            forced_team: None,
        },
    )
    .await
}

/// Handles the `ForcePick` command: places a pick for the team on the clock.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` for non-commissioners and
/// `DomainError::Conflict` when `team_id` is not the team on the clock, plus
/// every placement failure.
pub async fn handle_force_pick(
    command: &ForcePick,
    ctx: DraftContext<'_>,
) -> Result<Pick, DomainError> {
    command.actor.require_commissioner()?;
    ensure_positive_id("item_id", command.item_id)?;
    if let Some(team_id) = command.team_id {
        ensure_positive_id("team_id", team_id)?;
    }

    place_pick(
        ctx,
        &PlacementRequest {
            correlation_id: command.correlation_id,
            season_id: command.season_id,
            item_id: command.item_id,
            requesting_team: command.actor.team_id,
            is_commissioner: true,
            forced_team: command.team_id,
        },
    )
    .await
}

/// Handles the `UndoLastPick` command: deletes the pick with the highest
/// overall number. Returns the removed pick.
///
/// # Errors
///
/// Returns `DomainError::Conflict` when the ledger is empty or a concurrent
/// undo removed the pick first.
pub async fn handle_undo_last_pick(
    command: &UndoLastPick,
    ctx: DraftContext<'_>,
) -> Result<Pick, DomainError> {
    command.actor.require_commissioner()?;
    let season_id = command.season_id;

    let mut tx = ctx.store.begin().await?;
    tx.session(season_id, SessionLock::Exclusive).await?;
    let picks = tx.picks(season_id).await?;
    let last = ledger::last_pick(&picks)
        .cloned()
        .ok_or_else(|| DomainError::Conflict("there are no picks to undo".to_owned()))?;
    tx.delete_pick(season_id, last.id).await?;
    tx.commit().await?;

    info!(
        correlation_id = %command.correlation_id,
        season_id,
        team_id = last.team_id,
        item_id = last.item_id,
        overall_pick_number = last.overall_pick_number,
        "pick undone"
    );
    Ok(last)
}

/// Handles the `AdvanceDraft` command: auto-picks for the team on the clock.
///
/// The team's watchlist is tried first, in order. Failing that, the catalog
/// is scanned at most [`AUTO_PICK_MAX_PAGES`] pages of
/// [`AUTO_PICK_PAGE_SIZE`] items for the first item that is unclaimed,
/// draftable and not banned.
///
/// # Errors
///
/// Returns `DomainError::Conflict` with "no available items" when the
/// bounded scan finds nothing, plus every placement failure.
pub async fn handle_advance_draft(
    command: &AdvanceDraft,
    ctx: DraftContext<'_>,
) -> Result<Pick, DomainError> {
    command.actor.require_commissioner()?;
    let season_id = command.season_id;

    let session = ctx.store.ensure_session(season_id).await?;
    ensure_accepting_picks(&session)?;
    let participants = ctx.store.participants(season_id).await?;
    let picks = ctx.store.picks(season_id).await?;
    let on_clock = compute_turn(session.ordering_mode, &participants, picks.len())
        .team_id
        .ok_or_else(|| DomainError::Conflict("draft has no participants to pick".to_owned()))?;

    let item_id = match watchlist_candidate(ctx, season_id, on_clock, &picks).await? {
        Some(item_id) => item_id,
        None => scan_candidate(ctx, season_id, &picks)
            .await?
            .ok_or_else(|| DomainError::Conflict("no available items".to_owned()))?,
    };

    info!(
        correlation_id = %command.correlation_id,
        season_id,
        team_id = on_clock,
        item_id,
        "auto-picking for team on the clock"
    );
    place_pick(
        ctx,
        &PlacementRequest {
            correlation_id: command.correlation_id,
            season_id,
            item_id,
            requesting_team: command.actor.team_id,
            is_commissioner: true,
            forced_team: Some(on_clock),
        },
    )
    .await
}

async fn watchlist_candidate(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
    team_id: TeamId,
    picks: &[Pick],
) -> Result<Option<ItemId>, DomainError> {
    let watchlist = ctx.store.watchlist(season_id, team_id).await?;
    if watchlist.is_empty() {
        return Ok(None);
    }
    let claims = ledger::claims(picks);
    let items = ctx.catalog.items(season_id, &watchlist).await?;

    Ok(watchlist.into_iter().find(|item_id| {
        !claims.contains_key(item_id)
            && items
                .iter()
                .any(|item| item.item_id == *item_id && item.is_draftable() && !item.banned)
    }))
}

async fn scan_candidate(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
    picks: &[Pick],
) -> Result<Option<ItemId>, DomainError> {
    let claims = ledger::claims(picks);

    for page in 1..=AUTO_PICK_MAX_PAGES {
        let batch = ctx
            .catalog
            .browse(season_id, &PoolQuery::page(page, AUTO_PICK_PAGE_SIZE))
            .await?;
        let found = batch.items.iter().find(|item| {
            !claims.contains_key(&item.item_id) && item.is_draftable() && !item.banned
        });
        if let Some(item) = found {
            return Ok(Some(item.item_id));
        }
        if batch.items.len() < AUTO_PICK_PAGE_SIZE as usize {
            break;
        }
    }
    Ok(None)
}

/// Opens a transaction holding the session exclusively and checks that the
/// draft rules may still change.
async fn begin_rules_change(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
) -> Result<(Box<dyn DraftTransaction>, DraftSession), DomainError> {
    let mut tx = ctx.store.begin().await?;
    let session = tx.session(season_id, SessionLock::Exclusive).await?;
    let picks = tx.picks(season_id).await?;
    ensure_rules_mutable(&session, picks.len())?;
    Ok((tx, session))
}

/// Handles the `RerollOrder` command: shuffles participant positions.
///
/// The `Mutex` is locked only around the synchronous shuffle, never across
/// an await point.
///
/// # Errors
///
/// Returns `DomainError::Conflict` once the draft has started or any pick
/// exists.
pub async fn handle_reroll_order(
    command: &RerollOrder,
    ctx: DraftContext<'_>,
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<Vec<Participant>, DomainError> {
    command.actor.require_commissioner()?;
    let season_id = command.season_id;

    let (mut tx, _session) = begin_rules_change(ctx, season_id).await?;
    let mut order: Vec<TeamId> = tx
        .participants(season_id)
        .await?
        .iter()
        .map(|p| p.team_id)
        .collect();
    {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        shuffle_order(&mut order, &mut *rng_guard);
    }
    tx.assign_positions(season_id, &order).await?;
    let participants = tx.participants(season_id).await?;
    tx.commit().await?;

    info!(
        correlation_id = %command.correlation_id,
        season_id,
        order = ?order,
        "draft order rerolled"
    );
    Ok(participants)
}

/// Handles the `ReorderParticipants` command: seats participants in the
/// given order.
///
/// # Errors
///
/// Returns `DomainError::Validation` unless `team_ids` is an exact
/// permutation of the participants, and `DomainError::Conflict` once the
/// draft has started or any pick exists.
pub async fn handle_reorder_participants(
    command: &ReorderParticipants,
    ctx: DraftContext<'_>,
) -> Result<Vec<Participant>, DomainError> {
    command.actor.require_commissioner()?;
    if command.team_ids.is_empty() {
        return Err(DomainError::Validation(
            "team_ids must not be empty".to_owned(),
        ));
    }
    for team_id in &command.team_ids {
        ensure_positive_id("team_id", *team_id)?;
    }
    let season_id = command.season_id;

    let (mut tx, _session) = begin_rules_change(ctx, season_id).await?;
    let existing = tx.participants(season_id).await?;
    validate_manual_order(&existing, &command.team_ids)?;
    tx.assign_positions(season_id, &command.team_ids).await?;
    let participants = tx.participants(season_id).await?;
    tx.commit().await?;

    info!(
        correlation_id = %command.correlation_id,
        season_id,
        order = ?command.team_ids,
        "draft order set"
    );
    Ok(participants)
}

/// Handles the `UpdateSettings` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty or out-of-range patch and
/// `DomainError::Conflict` once the draft has started or any pick exists.
pub async fn handle_update_settings(
    command: &UpdateSettings,
    ctx: DraftContext<'_>,
) -> Result<DraftSession, DomainError> {
    command.actor.require_commissioner()?;
    command.patch.validate()?;
    let season_id = command.season_id;

    let (mut tx, mut session) = begin_rules_change(ctx, season_id).await?;
    command.patch.apply_to(&mut session);
    tx.save_session(&session).await?;
    tx.commit().await?;

    info!(
        correlation_id = %command.correlation_id,
        season_id,
        ordering_mode = %session.ordering_mode,
        pick_timer_seconds = ?session.pick_timer_seconds,
        round_count = ?session.round_count,
        "draft settings updated"
    );
    Ok(session)
}

/// Applies a lifecycle transition under an exclusive session lock and sends
/// the season notifications before committing, so a failed notification
/// leaves the status unchanged.
///
/// With a pooled store the notification borrows a second connection while
/// the transaction's connection still holds the session row lock. Each
/// concurrent start or end therefore needs two connections, and a pool
/// smaller than that waits until the pool's acquire timeout.
async fn apply_transition(
    ctx: DraftContext<'_>,
    actor: &Actor,
    correlation_id: Uuid,
    season_id: SeasonId,
    requested: Transition,
) -> Result<DraftSession, DomainError> {
    actor.require_commissioner()?;

    let mut tx = ctx.store.begin().await?;
    let mut session = tx.session(season_id, SessionLock::Exclusive).await?;
    let participant_count = if requested == Transition::Start {
        seat_new_teams(ctx, tx.as_mut(), season_id).await?.len()
    } else {
        tx.participants(season_id).await?.len()
    };

    let TransitionOutcome::Changed(next) =
        transition(session.status, requested, participant_count)?
    else {
        return Ok(session);
    };
    let previous = session.status;
    session.status = next;
    tx.save_session(&session).await?;
    match requested {
        Transition::Start => ctx.directory.mark_drafting(season_id).await?,
        Transition::End => ctx.directory.mark_active(season_id).await?,
        Transition::Pause | Transition::Resume => {}
    }
    tx.commit().await?;

    info!(
        correlation_id = %correlation_id,
        season_id,
        transition = requested.as_str(),
        from = %previous,
        to = %next,
        "draft status changed"
    );
    Ok(session)
}

/// Handles the `StartDraft` command. Seats any roster teams that have not
/// joined yet before checking that participants exist.
///
/// # Errors
///
/// Returns `DomainError::Conflict` unless the draft is `NotStarted` or
/// `Lobby` with at least one participant.
pub async fn handle_start_draft(
    command: &StartDraft,
    ctx: DraftContext<'_>,
) -> Result<DraftSession, DomainError> {
    apply_transition(
        ctx,
        &command.actor,
        command.correlation_id,
        command.season_id,
        Transition::Start,
    )
    .await
}

/// Handles the `PauseDraft` command.
///
/// # Errors
///
/// Returns `DomainError::Conflict` unless the draft is in progress.
pub async fn handle_pause_draft(
    command: &PauseDraft,
    ctx: DraftContext<'_>,
) -> Result<DraftSession, DomainError> {
    apply_transition(
        ctx,
        &command.actor,
        command.correlation_id,
        command.season_id,
        Transition::Pause,
    )
    .await
}

/// Handles the `ResumeDraft` command.
///
/// # Errors
///
/// Returns `DomainError::Conflict` unless the draft is paused.
pub async fn handle_resume_draft(
    command: &ResumeDraft,
    ctx: DraftContext<'_>,
) -> Result<DraftSession, DomainError> {
    apply_transition(
        ctx,
        &command.actor,
        command.correlation_id,
        command.season_id,
        Transition::Resume,
    )
    .await
}

/// Handles the `EndDraft` command. Ending a completed draft is a no-op.
///
/// # Errors
///
/// Returns `DomainError::Conflict` when the draft never started.
pub async fn handle_end_draft(
    command: &EndDraft,
    ctx: DraftContext<'_>,
) -> Result<DraftSession, DomainError> {
    apply_transition(
        ctx,
        &command.actor,
        command.correlation_id,
        command.season_id,
        Transition::End,
    )
    .await
}

/// Handles the `ToggleReady` command: flips a participant's ready flag. The
/// first team to ready up moves a fresh session into the lobby.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` unless the caller manages the team, and
/// `DomainError::NotFound` when the team is not in the draft.
pub async fn handle_toggle_ready(
    command: &ToggleReady,
    ctx: DraftContext<'_>,
) -> Result<Participant, DomainError> {
    ensure_positive_id("team_id", command.team_id)?;
    command.actor.require_manages(command.team_id)?;
    let season_id = command.season_id;

    let mut tx = ctx.store.begin().await?;
    let mut session = tx.session(season_id, SessionLock::Exclusive).await?;
    let participants = seat_new_teams(ctx, tx.as_mut(), season_id).await?;
    let mut participant = participants
        .into_iter()
        .find(|p| p.team_id == command.team_id)
        .ok_or_else(|| DomainError::not_found("participant", command.team_id))?;

    participant.is_ready = !participant.is_ready;
    tx.set_ready(season_id, participant.team_id, participant.is_ready)
        .await?;
    if participant.is_ready {
        let next = status_after_ready(session.status);
        if next != session.status {
            session.status = next;
            tx.save_session(&session).await?;
        }
    }
    tx.commit().await?;

    info!(
        correlation_id = %command.correlation_id,
        season_id,
        team_id = participant.team_id,
        is_ready = participant.is_ready,
        "ready flag toggled"
    );
    Ok(participant)
}

/// Handles the `UpdateWatchlist` command: replaces the team's watchlist.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` unless the caller manages the team,
/// `DomainError::Validation` for malformed ids, and `DomainError::NotFound`
/// for an unknown team or item.
pub async fn handle_update_watchlist(
    command: &UpdateWatchlist,
    ctx: DraftContext<'_>,
) -> Result<Vec<ItemId>, DomainError> {
    ensure_positive_id("team_id", command.team_id)?;
    command.actor.require_manages(command.team_id)?;
    let season_id = command.season_id;

    let teams = ctx.directory.teams(season_id).await?;
    if !teams.iter().any(|team| team.team_id == command.team_id) {
        return Err(DomainError::not_found("team", command.team_id));
    }

    let item_ids = normalize_watchlist(&command.item_ids)?;
    let known = ctx.catalog.items(season_id, &item_ids).await?;
    if let Some(missing) = item_ids
        .iter()
        .find(|id| !known.iter().any(|item| item.item_id == **id))
    {
        return Err(DomainError::not_found("item", *missing));
    }

    let mut tx = ctx.store.begin().await?;
    tx.replace_watchlist(season_id, command.team_id, &item_ids)
        .await?;
    tx.commit().await?;

    info!(
        correlation_id = %command.correlation_id,
        season_id,
        team_id = command.team_id,
        entries = item_ids.len(),
        "watchlist replaced"
    );
    Ok(item_ids)
}
