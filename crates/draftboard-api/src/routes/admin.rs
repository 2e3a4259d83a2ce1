//! Commissioner routes: lifecycle control, overrides and settings.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use draftboard_core::model::{DraftSession, ItemId, OrderingMode, Participant, Pick, SeasonId, TeamId};
use draftboard_engine::application::command_handlers;
use draftboard_engine::domain::commands;
use draftboard_engine::domain::settings::SettingsPatch;
use serde::{Deserialize, Deserializer};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::AppState;

/// Request body for POST /admin/force-pick.
#[derive(Debug, Deserialize)]
pub struct ForcePickRequest {
    /// The item being drafted.
    pub item_id: ItemId,
    /// Optional guard: the team expected to be on the clock.
    pub team_id: Option<TeamId>,
}

/// Request body for POST /admin/reorder.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Every participant, in the new pick order.
    pub team_ids: Vec<TeamId>,
}

/// Request body for PATCH /admin/settings.
///
/// Absent fields stay unchanged; an explicit `null` clears a nullable setting.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub ordering_mode: Option<OrderingMode>,
    #[serde(default, deserialize_with = "present")]
    pub starts_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub pick_timer_seconds: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub round_count: Option<Option<i32>>,
}

/// Marks a field as present, keeping `null` distinct from absent.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateSettingsRequest> for SettingsPatch {
    fn from(request: UpdateSettingsRequest) -> Self {
        Self {
            ordering_mode: request.ordering_mode,
            starts_at: request.starts_at,
            pick_timer_seconds: request.pick_timer_seconds,
            round_count: request.round_count,
        }
    }
}

/// POST /seasons/{season_id}/draft/admin/start
#[instrument(skip(state))]
async fn start_draft(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<DraftSession>, ApiError> {
    let command = commands::StartDraft {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
    };

    info!(correlation_id = %command.correlation_id, "handling start_draft command");

    let session = command_handlers::handle_start_draft(&command, state.context()).await?;
    Ok(Json(session))
}

/// POST /seasons/{season_id}/draft/admin/pause
#[instrument(skip(state))]
async fn pause_draft(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<DraftSession>, ApiError> {
    let command = commands::PauseDraft {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
    };

    info!(correlation_id = %command.correlation_id, "handling pause_draft command");

    let session = command_handlers::handle_pause_draft(&command, state.context()).await?;
    Ok(Json(session))
}

/// POST /seasons/{season_id}/draft/admin/resume
#[instrument(skip(state))]
async fn resume_draft(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<DraftSession>, ApiError> {
    let command = commands::ResumeDraft {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
    };

    info!(correlation_id = %command.correlation_id, "handling resume_draft command");

    let session = command_handlers::handle_resume_draft(&command, state.context()).await?;
    Ok(Json(session))
}

/// POST /seasons/{season_id}/draft/admin/end
#[instrument(skip(state))]
async fn end_draft(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<DraftSession>, ApiError> {
    let command = commands::EndDraft {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
    };

    info!(correlation_id = %command.correlation_id, "handling end_draft command");

    let session = command_handlers::handle_end_draft(&command, state.context()).await?;
    Ok(Json(session))
}

/// POST /seasons/{season_id}/draft/admin/undo
#[instrument(skip(state))]
async fn undo_last_pick(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<Pick>, ApiError> {
    let command = commands::UndoLastPick {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
    };

    info!(correlation_id = %command.correlation_id, "handling undo_last_pick command");

    let removed = command_handlers::handle_undo_last_pick(&command, state.context()).await?;
    Ok(Json(removed))
}

/// POST /seasons/{season_id}/draft/admin/advance
#[instrument(skip(state))]
async fn advance_draft(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<(StatusCode, Json<Pick>), ApiError> {
    let command = commands::AdvanceDraft {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
    };

    info!(correlation_id = %command.correlation_id, "handling advance_draft command");

    let pick = command_handlers::handle_advance_draft(&command, state.context()).await?;
    Ok((StatusCode::CREATED, Json(pick)))
}

/// POST /seasons/{season_id}/draft/admin/reroll
#[instrument(skip(state))]
async fn reroll_order(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<Vec<Participant>>, ApiError> {
    let command = commands::RerollOrder {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
    };

    info!(correlation_id = %command.correlation_id, "handling reroll_order command");

    let participants =
        command_handlers::handle_reroll_order(&command, state.context(), &state.rng).await?;
    Ok(Json(participants))
}

/// POST /seasons/{season_id}/draft/admin/force-pick
#[instrument(skip(state, request), fields(item_id = request.item_id, team_id = ?request.team_id))]
async fn force_pick(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
    Json(request): Json<ForcePickRequest>,
) -> Result<(StatusCode, Json<Pick>), ApiError> {
    let command = commands::ForcePick {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
        item_id: request.item_id,
        team_id: request.team_id,
    };

    info!(correlation_id = %command.correlation_id, "handling force_pick command");

    let pick = command_handlers::handle_force_pick(&command, state.context()).await?;
    Ok((StatusCode::CREATED, Json(pick)))
}

/// POST /seasons/{season_id}/draft/admin/reorder
#[instrument(skip(state, request), fields(teams = request.team_ids.len()))]
async fn reorder_participants(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    let command = commands::ReorderParticipants {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
        team_ids: request.team_ids,
    };

    info!(correlation_id = %command.correlation_id, "handling reorder_participants command");

    let participants =
        command_handlers::handle_reorder_participants(&command, state.context()).await?;
    Ok(Json(participants))
}

/// PATCH /seasons/{season_id}/draft/admin/settings
#[instrument(skip(state, request))]
async fn update_settings(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<DraftSession>, ApiError> {
    let command = commands::UpdateSettings {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
        patch: request.into(),
    };

    info!(correlation_id = %command.correlation_id, "handling update_settings command");

    let session = command_handlers::handle_update_settings(&command, state.context()).await?;
    Ok(Json(session))
}

/// Returns the router for commissioner draft routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/seasons/{season_id}/draft/admin/start", post(start_draft))
        .route("/seasons/{season_id}/draft/admin/pause", post(pause_draft))
        .route("/seasons/{season_id}/draft/admin/resume", post(resume_draft))
        .route("/seasons/{season_id}/draft/admin/end", post(end_draft))
        .route("/seasons/{season_id}/draft/admin/undo", post(undo_last_pick))
        .route("/seasons/{season_id}/draft/admin/advance", post(advance_draft))
        .route("/seasons/{season_id}/draft/admin/reroll", post(reroll_order))
        .route("/seasons/{season_id}/draft/admin/force-pick", post(force_pick))
        .route(
            "/seasons/{season_id}/draft/admin/reorder",
            post(reorder_participants),
        )
        .route(
            "/seasons/{season_id}/draft/admin/settings",
            patch(update_settings),
        )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use draftboard_core::model::{DraftSession, DraftStatus};
    use draftboard_test_support::{InMemoryDraftStore, SequenceRng};
    use serde_json::json;

    use super::*;
    use crate::routes::testing::{COMMISSIONER, SEASON, TestApp, manager_of, running_store};

    fn lobby_store() -> InMemoryDraftStore {
        InMemoryDraftStore::new()
            .with_session(DraftSession {
                status: DraftStatus::Lobby,
                ..DraftSession::new(SEASON)
            })
            .with_participants(SEASON, &[10, 20])
    }

    #[test]
    fn test_settings_request_distinguishes_null_from_absent() {
        let request: UpdateSettingsRequest =
            serde_json::from_value(json!({ "pick_timer_seconds": null, "round_count": 4 }))
                .unwrap();

        let patch = SettingsPatch::from(request);

        assert_eq!(patch.pick_timer_seconds, Some(None));
        assert_eq!(patch.round_count, Some(Some(4)));
        assert_eq!(patch.starts_at, None);
        assert_eq!(patch.ordering_mode, None);
    }

    #[test]
    fn test_settings_request_rejects_unknown_fields() {
        let result =
            serde_json::from_value::<UpdateSettingsRequest>(json!({ "budget": 100 }));

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_start_by_manager_is_forbidden() {
        let app = TestApp::new(router(), lobby_store());

        let (status, body) = app
            .send("POST", "/seasons/7/draft/admin/start", Some(manager_of(10)), None)
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_start_pause_resume_end_walk_the_lifecycle() {
        // Arrange
        let app = TestApp::new(router(), lobby_store());

        // Act / Assert
        for (action, expected) in [
            ("start", "in_progress"),
            ("pause", "paused"),
            ("resume", "in_progress"),
            ("end", "completed"),
        ] {
            let uri = format!("/seasons/7/draft/admin/{action}");
            let (status, body) = app.send("POST", &uri, Some(COMMISSIONER), None).await;
            assert_eq!(status, StatusCode::OK, "{action}");
            assert_eq!(body["status"], expected, "{action}");
        }
        assert_eq!(
            app.directory.notifications(),
            vec![(SEASON, "drafting"), (SEASON, "active")]
        );
    }

    #[tokio::test]
    async fn test_resume_when_not_paused_is_conflict() {
        let app = TestApp::new(router(), running_store());

        let (status, _) = app
            .send("POST", "/seasons/7/draft/admin/resume", Some(COMMISSIONER), None)
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_force_pick_for_team_not_on_clock_is_conflict() {
        let app = TestApp::new(router(), running_store());

        let (status, body) = app
            .send(
                "POST",
                "/seasons/7/draft/admin/force-pick",
                Some(COMMISSIONER),
                Some(json!({ "item_id": 3, "team_id": 20 })),
            )
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["message"].as_str().unwrap().contains("not on the clock"));
    }

    #[tokio::test]
    async fn test_force_pick_then_undo_restores_the_clock() {
        // Arrange
        let app = TestApp::new(router(), running_store());
        let (status, _) = app
            .send(
                "POST",
                "/seasons/7/draft/admin/force-pick",
                Some(COMMISSIONER),
                Some(json!({ "item_id": 3 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        // Act
        let (status, removed) = app
            .send("POST", "/seasons/7/draft/admin/undo", Some(COMMISSIONER), None)
            .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed["item_id"], 3);
        assert_eq!(removed["team_id"], 10);
        assert!(app.store.committed_picks(SEASON).is_empty());
    }

    #[tokio::test]
    async fn test_undo_with_empty_ledger_is_conflict() {
        let app = TestApp::new(router(), running_store());

        let (status, _) = app
            .send("POST", "/seasons/7/draft/admin/undo", Some(COMMISSIONER), None)
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_advance_takes_lowest_available_item() {
        let app = TestApp::new(router(), running_store());

        let (status, pick) = app
            .send("POST", "/seasons/7/draft/admin/advance", Some(COMMISSIONER), None)
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(pick["team_id"], 10);
        assert_eq!(pick["item_id"], 1);
    }

    #[tokio::test]
    async fn test_reroll_uses_injected_rng() {
        // Arrange
        let app = TestApp::with_rng(router(), lobby_store(), SequenceRng::new(vec![0]));

        // Act
        let (status, body) = app
            .send("POST", "/seasons/7/draft/admin/reroll", Some(COMMISSIONER), None)
            .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let order: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["team_id"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![20, 10]);
    }

    #[tokio::test]
    async fn test_reorder_after_start_is_conflict() {
        let app = TestApp::new(router(), running_store());

        let (status, _) = app
            .send(
                "POST",
                "/seasons/7/draft/admin/reorder",
                Some(COMMISSIONER),
                Some(json!({ "team_ids": [20, 10] })),
            )
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_settings_patch_clears_and_validates() {
        // Arrange
        let app = TestApp::new(router(), lobby_store());

        // Act
        let (ok_status, session) = app
            .send(
                "PATCH",
                "/seasons/7/draft/admin/settings",
                Some(COMMISSIONER),
                Some(json!({ "ordering_mode": "linear", "pick_timer_seconds": null, "round_count": 3 })),
            )
            .await;
        let (bad_status, body) = app
            .send(
                "PATCH",
                "/seasons/7/draft/admin/settings",
                Some(COMMISSIONER),
                Some(json!({ "pick_timer_seconds": 2 })),
            )
            .await;

        // Assert
        assert_eq!(ok_status, StatusCode::OK);
        assert_eq!(session["ordering_mode"], "linear");
        assert!(session["pick_timer_seconds"].is_null());
        assert_eq!(session["round_count"], 3);
        assert_eq!(bad_status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }
}
