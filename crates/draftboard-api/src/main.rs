//! Draftboard API server entry point.

use draftboard_api::app::build_router;
use draftboard_api::config::Config;
use draftboard_api::error::AppError;
use draftboard_api::state::AppState;
use draftboard_api::telemetry;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let telemetry = telemetry::init(&config)?;

    info!(service = %config.service_name, "starting draftboard API server");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    info!("connected to database");

    sqlx::migrate!("../../migrations").run(&pool).await?;

    info!("migrations applied");

    let app = build_router(AppState::postgres(pool));

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
