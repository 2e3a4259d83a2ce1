//! Routes for participants: lobby, live state, the item pool, watchlists,
//! pick submission and results.

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use draftboard_core::collaborators::PoolQuery;
use draftboard_core::model::{ItemId, Participant, Pick, SeasonId, TeamId};
use draftboard_engine::application::export::{self, ExportFormat};
use draftboard_engine::application::query_handlers::{
    self, LobbyView, MyDraftView, PoolView, ResultsView, StateView, TeamResults,
};
use draftboard_engine::application::command_handlers;
use draftboard_engine::domain::commands;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::AppState;

const DEFAULT_POOL_PAGE_SIZE: u32 = 50;

/// Request body for POST /ready.
#[derive(Debug, Deserialize)]
pub struct ToggleReadyRequest {
    /// The team whose ready flag flips.
    pub team_id: TeamId,
}

/// Request body for PUT /watchlist.
#[derive(Debug, Deserialize)]
pub struct UpdateWatchlistRequest {
    /// Preferred items, most wanted first.
    pub item_ids: Vec<ItemId>,
}

/// Response body for PUT /watchlist.
#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    /// The stored watchlist after dedupe and truncation.
    pub item_ids: Vec<ItemId>,
}

/// Request body for POST /picks.
#[derive(Debug, Deserialize)]
pub struct SubmitPickRequest {
    /// The item being drafted.
    pub item_id: ItemId,
}

/// Query string for GET /pool.
#[derive(Debug, Default, Deserialize)]
pub struct PoolParams {
    pub search: Option<String>,
    pub item_type: Option<String>,
    pub role: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<PoolParams> for PoolQuery {
    fn from(params: PoolParams) -> Self {
        Self {
            search: params.search.filter(|s| !s.trim().is_empty()),
            item_type: params.item_type.filter(|s| !s.is_empty()),
            role: params.role.filter(|s| !s.is_empty()),
            page: params.page.unwrap_or(1),
            page_size: params.page_size.unwrap_or(DEFAULT_POOL_PAGE_SIZE),
        }
    }
}

/// Query string for GET /results/export.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// `csv` (default) or `text`.
    pub format: Option<String>,
}

/// GET /seasons/{season_id}/draft/lobby
#[instrument(skip(state))]
async fn get_lobby(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<LobbyView>, ApiError> {
    state.actor(season_id, user_id).await?;
    let lobby = query_handlers::get_lobby(state.context(), season_id).await?;
    Ok(Json(lobby))
}

/// POST /seasons/{season_id}/draft/ready
#[instrument(skip(state, request), fields(team_id = request.team_id))]
async fn toggle_ready(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
    Json(request): Json<ToggleReadyRequest>,
) -> Result<Json<Participant>, ApiError> {
    let command = commands::ToggleReady {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
        team_id: request.team_id,
    };

    info!(correlation_id = %command.correlation_id, "handling toggle_ready command");

    let participant = command_handlers::handle_toggle_ready(&command, state.context()).await?;
    Ok(Json(participant))
}

/// GET /seasons/{season_id}/draft/state
#[instrument(skip(state))]
async fn get_state(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<StateView>, ApiError> {
    state.actor(season_id, user_id).await?;
    let view = query_handlers::get_state(state.context(), season_id).await?;
    Ok(Json(view))
}

/// GET /seasons/{season_id}/draft/pool
#[instrument(skip(state))]
async fn get_pool(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Query(params): Query<PoolParams>,
    Caller(user_id): Caller,
) -> Result<Json<PoolView>, ApiError> {
    state.actor(season_id, user_id).await?;
    let query = PoolQuery::from(params);
    let view = query_handlers::get_pool(state.context(), season_id, &query).await?;
    Ok(Json(view))
}

/// GET /seasons/{season_id}/draft/me
#[instrument(skip(state))]
async fn get_my_draft(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<MyDraftView>, ApiError> {
    let actor = state.actor(season_id, user_id).await?;
    let view = query_handlers::get_my_draft(state.context(), season_id, &actor).await?;
    Ok(Json(view))
}

/// PUT /seasons/{season_id}/draft/watchlist
#[instrument(skip(state, request), fields(items = request.item_ids.len()))]
async fn update_watchlist(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
    Json(request): Json<UpdateWatchlistRequest>,
) -> Result<Json<WatchlistResponse>, ApiError> {
    let actor = state.actor(season_id, user_id).await?;
    let command = commands::UpdateWatchlist {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor,
        team_id: actor.require_team()?,
        item_ids: request.item_ids,
    };

    info!(correlation_id = %command.correlation_id, "handling update_watchlist command");

    let item_ids = command_handlers::handle_update_watchlist(&command, state.context()).await?;
    Ok(Json(WatchlistResponse { item_ids }))
}

/// POST /seasons/{season_id}/draft/picks
#[instrument(skip(state, request), fields(item_id = request.item_id))]
async fn submit_pick(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
    Json(request): Json<SubmitPickRequest>,
) -> Result<(StatusCode, Json<Pick>), ApiError> {
    let command = commands::SubmitPick {
        correlation_id: Uuid::new_v4(),
        season_id,
        actor: state.actor(season_id, user_id).await?,
        item_id: request.item_id,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_pick command");

    let pick = command_handlers::handle_submit_pick(&command, state.context()).await?;
    Ok((StatusCode::CREATED, Json(pick)))
}

/// GET /seasons/{season_id}/draft/results
#[instrument(skip(state))]
async fn get_results(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Caller(user_id): Caller,
) -> Result<Json<ResultsView>, ApiError> {
    state.actor(season_id, user_id).await?;
    let view = query_handlers::get_results(state.context(), season_id).await?;
    Ok(Json(view))
}

/// GET /seasons/{season_id}/draft/results/teams/{team_id}
#[instrument(skip(state))]
async fn get_team_results(
    State(state): State<AppState>,
    Path((season_id, team_id)): Path<(SeasonId, TeamId)>,
    Caller(user_id): Caller,
) -> Result<Json<TeamResults>, ApiError> {
    state.actor(season_id, user_id).await?;
    let view = query_handlers::get_team_results(state.context(), season_id, team_id).await?;
    Ok(Json(view))
}

/// GET /seasons/{season_id}/draft/results/export
#[instrument(skip(state))]
async fn export_results(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
    Query(params): Query<ExportParams>,
    Caller(user_id): Caller,
) -> Result<Response, ApiError> {
    state.actor(season_id, user_id).await?;
    let format: ExportFormat = params.format.as_deref().unwrap_or("csv").parse()?;
    let body = export::export_results(state.context(), season_id, format).await?;

    let disposition = format!(
        "attachment; filename=\"draft-season-{season_id}.{}\"",
        format.extension()
    );
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_owned()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, body).into_response())
}

/// Returns the router for participant-facing draft routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/seasons/{season_id}/draft/lobby", get(get_lobby))
        .route("/seasons/{season_id}/draft/ready", post(toggle_ready))
        .route("/seasons/{season_id}/draft/state", get(get_state))
        .route("/seasons/{season_id}/draft/pool", get(get_pool))
        .route("/seasons/{season_id}/draft/me", get(get_my_draft))
        .route("/seasons/{season_id}/draft/watchlist", put(update_watchlist))
        .route("/seasons/{season_id}/draft/picks", post(submit_pick))
        .route("/seasons/{season_id}/draft/results", get(get_results))
        .route(
            "/seasons/{season_id}/draft/results/teams/{team_id}",
            get(get_team_results),
        )
        .route(
            "/seasons/{season_id}/draft/results/export",
            get(export_results),
        )
}
