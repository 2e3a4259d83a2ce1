//! Router assembly.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    // TODO: Restrict CORS origins once the web client's deployment origin is fixed.
    Router::new()
        .merge(routes::health::router())
        .nest(
            "/api/v1",
            routes::draft::router().merge(routes::admin::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
