//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use draftboard_core::rng::DeterministicRng;
use draftboard_store::pg_catalog::PgItemCatalog;
use draftboard_store::pg_directory::{PgPermissionChecker, PgSeasonDirectory};
use draftboard_store::pg_draft_store::PgDraftStore;
use draftboard_test_support::{FixedClock, SequenceRng};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use draftboard_api::app::build_router;
use draftboard_api::extract::USER_ID_HEADER;
use draftboard_api::state::AppState;

/// Season 1 in league 1. Teams 101 (user 11) and 102 (user 12); user 1 is
/// commissioner. Items 1..=5 exist, item 4 is banned.
pub async fn seed(pool: &PgPool) {
    for statement in [
        "INSERT INTO users (user_id, display_name) VALUES \
         (1, 'Commish'), (11, 'Ash'), (12, 'Misty')",
        "INSERT INTO seasons (season_id, league_id, name) VALUES (1, 1, 'Spring')",
        "INSERT INTO league_members (league_id, user_id, role) VALUES \
         (1, 1, 'commissioner'), (1, 11, 'member'), (1, 12, 'member')",
        "INSERT INTO teams (team_id, season_id, name, manager_user_id) VALUES \
         (101, 1, 'Pallet', 11), (102, 1, 'Cerulean', 12)",
        "INSERT INTO catalog_items (item_id, name, item_types, role, cost) VALUES \
         (1, 'Bulbasaur', '{grass}', 'tank', 2), \
         (2, 'Charmander', '{fire}', 'sweeper', 2), \
         (3, 'Squirtle', '{water}', 'tank', 2), \
         (4, 'Mewtwo', '{psychic}', 'sweeper', 9), \
         (5, 'Pikachu', '{electric}', 'sweeper', 3)",
        "INSERT INTO season_item_bans (season_id, item_id) VALUES (1, 4)",
    ] {
        sqlx::query(statement).execute(pool).await.unwrap();
    }
}

/// Build the full app router over Postgres with a fixed clock and a scripted
/// RNG. Uses the same router as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_rng(pool, SequenceRng::new(vec![]))
}

/// Same as [`build_test_app`] with a custom RNG for reroll tests.
pub fn build_test_app_with_rng(pool: PgPool, rng: SequenceRng) -> Router {
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let state = AppState::new(
        Arc::new(PgDraftStore::new(pool.clone())),
        Arc::new(PgItemCatalog::new(pool.clone())),
        Arc::new(PgSeasonDirectory::new(pool.clone())),
        Arc::new(PgPermissionChecker::new(pool)),
        Arc::new(FixedClock::draft_day()),
        rng,
    );
    build_router(state)
}

/// Send a request as `user_id` and return the status and JSON body.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: i64,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send(app, method, uri, user_id, body).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a GET request as `user_id` and return the status and body text.
pub async fn get_text(app: &Router, uri: &str, user_id: i64) -> (StatusCode, String) {
    let (status, bytes) = send(app, "GET", uri, user_id, None).await;
    (status, String::from_utf8(bytes).unwrap())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: i64,
    body: Option<&serde_json::Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user_id.to_string());
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}
