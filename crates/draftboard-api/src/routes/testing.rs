//! In-memory harness for route unit tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use draftboard_core::model::{DraftSession, DraftStatus, LeagueId, SeasonId, TeamId, UserId};
use draftboard_core::rng::DeterministicRng;
use draftboard_test_support::{
    FixedClock, InMemoryDraftStore, MockRng, StaticCatalog, StaticDirectory, StaticPermissions,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::extract::USER_ID_HEADER;
use crate::state::AppState;

pub(crate) const SEASON: SeasonId = 7;
const LEAGUE: LeagueId = 1;
pub(crate) const COMMISSIONER: UserId = 1;
/// A league member who manages no team.
pub(crate) const OUTSIDER: UserId = 2;

pub(crate) fn manager_of(team_id: TeamId) -> UserId {
    team_id + 1000
}

/// Teams 10 and 20 seated in that order, draft in progress, no picks.
pub(crate) fn running_store() -> InMemoryDraftStore {
    InMemoryDraftStore::new()
        .with_session(DraftSession {
            status: DraftStatus::InProgress,
            ..DraftSession::new(SEASON)
        })
        .with_participants(SEASON, &[10, 20])
}

pub(crate) struct TestApp {
    router: Router,
    pub(crate) store: InMemoryDraftStore,
    pub(crate) directory: Arc<StaticDirectory>,
}

impl TestApp {
    pub(crate) fn new(routes: Router<AppState>, store: InMemoryDraftStore) -> Self {
        Self::with_rng(routes, store, MockRng)
    }

    pub(crate) fn with_rng(
        routes: Router<AppState>,
        store: InMemoryDraftStore,
        rng: impl DeterministicRng + Send + 'static,
    ) -> Self {
        let directory = Arc::new(
            StaticDirectory::new()
                .with_season(SEASON, LEAGUE)
                .with_team(SEASON, 10, "Pallet Town", manager_of(10))
                .with_team(SEASON, 20, "Cerulean City", manager_of(20)),
        );
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(StaticCatalog::numbered(30)),
            directory.clone(),
            Arc::new(StaticPermissions::new().with_commissioner(LEAGUE, COMMISSIONER)),
            Arc::new(FixedClock::draft_day()),
            rng,
        );

        Self {
            router: routes.with_state(state),
            store,
            directory,
        }
    }

    /// Sends a request and decodes the JSON response (`Null` when the body is
    /// not JSON).
    pub(crate) async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Sends a GET and returns headers plus the body as text.
    pub(crate) async fn send_raw(&self, uri: &str, user: UserId) -> (StatusCode, HeaderMap, String) {
        let request = Request::builder()
            .uri(uri)
            .header(USER_ID_HEADER, user.to_string())
            .body(Body::empty())
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
