//! Caller resolution.

use draftboard_core::collaborators::{PermissionChecker, SeasonDirectory};
use draftboard_core::error::DomainError;
use draftboard_core::model::{SeasonId, UserId};

use crate::domain::actor::Actor;
use crate::domain::ensure_positive_id;

/// Resolves what `user_id` may do in `season_id`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a non-positive season id,
/// `DomainError::NotFound` when the season is unknown, and whatever the
/// collaborators return on failure.
pub async fn resolve_actor(
    season_id: SeasonId,
    user_id: UserId,
    directory: &dyn SeasonDirectory,
    permissions: &dyn PermissionChecker,
) -> Result<Actor, DomainError> {
    ensure_positive_id("season_id", season_id)?;
    let league_id = directory
        .league_for_season(season_id)
        .await?
        .ok_or_else(|| DomainError::not_found("season", season_id))?;
    let team_id = directory.team_for_user(season_id, user_id).await?;
    let is_commissioner = permissions.is_commissioner(league_id, user_id).await?;

    Ok(Actor {
        user_id,
        team_id,
        is_commissioner,
    })
}
