//! Concurrent placements against `PostgreSQL` through the engine handlers.

mod common;

use draftboard_core::error::DomainError;
use draftboard_engine::application::DraftContext;
use draftboard_engine::application::command_handlers::handle_force_pick;
use draftboard_engine::domain::actor::Actor;
use draftboard_engine::domain::commands::ForcePick;
use draftboard_store::pg_catalog::PgItemCatalog;
use draftboard_store::pg_directory::PgSeasonDirectory;
use draftboard_store::pg_draft_store::PgDraftStore;
use draftboard_test_support::FixedClock;
use sqlx::PgPool;
use uuid::Uuid;

const COMMISSIONER: i64 = 1;

fn force(item_id: i64) -> ForcePick {
    ForcePick {
        correlation_id: Uuid::new_v4(),
        season_id: 1,
        actor: Actor {
            user_id: COMMISSIONER,
            team_id: None,
            is_commissioner: true,
        },
        item_id,
        team_id: None,
    }
}

async fn start_draft(pool: &PgPool) {
    common::seed(pool).await;
    let app = common::build_test_app(pool.clone());
    let (status, _) = common::send_json(
        &app,
        "POST",
        "/api/v1/seasons/1/draft/admin/start",
        COMMISSIONER,
        None,
    )
    .await;
    assert!(status.is_success(), "start failed with {status}");
}

async fn overall_numbers(pool: &PgPool) -> Vec<i32> {
    sqlx::query_scalar(
        "SELECT overall_pick_number FROM draft_picks WHERE season_id = 1 \
         ORDER BY overall_pick_number",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

fn assert_one_winner<T: std::fmt::Debug>(a: Result<T, DomainError>, b: Result<T, DomainError>) {
    let (winner, loser) = if a.is_ok() { (a, b) } else { (b, a) };
    assert!(winner.is_ok(), "no placement succeeded: {winner:?}");
    match loser {
        Err(DomainError::Conflict(_)) => {}
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrent_force_picks_of_one_item_place_once(pool: PgPool) {
    // Arrange
    start_draft(&pool).await;
    let store = PgDraftStore::new(pool.clone());
    let catalog = PgItemCatalog::new(pool.clone());
    let directory = PgSeasonDirectory::new(pool.clone());
    let clock = FixedClock::draft_day();
    let ctx = DraftContext {
        store: &store,
        catalog: &catalog,
        directory: &directory,
        clock: &clock,
    };
    let first = force(1);
    let second = force(1);

    // Act
    let (a, b) = tokio::join!(handle_force_pick(&first, ctx), handle_force_pick(&second, ctx));

    // Assert
    assert_one_winner(a, b);
    assert_eq!(overall_numbers(&pool).await, [1]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrent_force_picks_of_one_slot_fill_it_once(pool: PgPool) {
    // Arrange
    start_draft(&pool).await;
    let store = PgDraftStore::new(pool.clone());
    let catalog = PgItemCatalog::new(pool.clone());
    let directory = PgSeasonDirectory::new(pool.clone());
    let clock = FixedClock::draft_day();
    let ctx = DraftContext {
        store: &store,
        catalog: &catalog,
        directory: &directory,
        clock: &clock,
    };
    let first = force(1);
    let second = force(2);

    // Act
    let (a, b) = tokio::join!(handle_force_pick(&first, ctx), handle_force_pick(&second, ctx));

    // Assert
    assert_one_winner(a, b);
    assert_eq!(overall_numbers(&pool).await, [1]);
}
