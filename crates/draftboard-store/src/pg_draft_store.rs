//! `PostgreSQL` implementation of `DraftStore` and `DraftTransaction`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use draftboard_core::error::DomainError;
use draftboard_core::model::{
    DraftSession, ItemId, NewPick, Participant, Pick, PickId, SeasonId, TeamId,
};
use draftboard_core::repository::{DraftStore, DraftTransaction, SessionLock};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};

use crate::errors::{corrupt_row, map_sqlx};

const SESSION_COLUMNS: &str =
    "season_id, status, ordering_mode, starts_at, pick_timer_seconds, round_count";

const PICK_COLUMNS: &str =
    "id, season_id, round, pick_in_round, overall_pick_number, team_id, item_id, created_at";

#[derive(sqlx::FromRow)]
struct SessionRow {
    season_id: i64,
    status: String,
    ordering_mode: String,
    starts_at: Option<DateTime<Utc>>,
    pick_timer_seconds: Option<i32>,
    round_count: Option<i32>,
}

impl TryFrom<SessionRow> for DraftSession {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            season_id: row.season_id,
            status: row
                .status
                .parse()
                .map_err(|e| corrupt_row("draft_sessions", &e))?,
            ordering_mode: row
                .ordering_mode
                .parse()
                .map_err(|e| corrupt_row("draft_sessions", &e))?,
            starts_at: row.starts_at,
            pick_timer_seconds: row.pick_timer_seconds,
            round_count: row.round_count,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ParticipantRow {
    season_id: i64,
    team_id: i64,
    position: i32,
    is_ready: bool,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Self {
            season_id: row.season_id,
            team_id: row.team_id,
            position: row.position,
            is_ready: row.is_ready,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PickRow {
    id: i64,
    season_id: i64,
    round: i32,
    pick_in_round: i32,
    overall_pick_number: i32,
    team_id: i64,
    item_id: i64,
    created_at: DateTime<Utc>,
}

impl From<PickRow> for Pick {
    fn from(row: PickRow) -> Self {
        Self {
            id: row.id,
            season_id: row.season_id,
            round: row.round,
            pick_in_round: row.pick_in_round,
            overall_pick_number: row.overall_pick_number,
            team_id: row.team_id,
            item_id: row.item_id,
            created_at: row.created_at,
        }
    }
}

async fn insert_default_session(
    conn: &mut PgConnection,
    season_id: SeasonId,
) -> Result<(), DomainError> {
    sqlx::query("INSERT INTO draft_sessions (season_id) VALUES ($1) ON CONFLICT (season_id) DO NOTHING")
        .bind(season_id)
        .execute(conn)
        .await
        .map_err(map_sqlx)?;
    Ok(())
}

async fn select_session(
    conn: &mut PgConnection,
    season_id: SeasonId,
    lock: Option<SessionLock>,
) -> Result<DraftSession, DomainError> {
    let suffix = match lock {
        None => "",
        Some(SessionLock::Shared) => " FOR SHARE",
        Some(SessionLock::Exclusive) => " FOR UPDATE",
    };
    let sql = format!("SELECT {SESSION_COLUMNS} FROM draft_sessions WHERE season_id = $1{suffix}");
    sqlx::query_as::<_, SessionRow>(&sql)
        .bind(season_id)
        .fetch_one(conn)
        .await
        .map_err(map_sqlx)?
        .try_into()
}

async fn select_participants(
    conn: &mut PgConnection,
    season_id: SeasonId,
) -> Result<Vec<Participant>, DomainError> {
    let rows = sqlx::query_as::<_, ParticipantRow>(
        "SELECT season_id, team_id, position, is_ready FROM draft_participants \
         WHERE season_id = $1 ORDER BY position",
    )
    .bind(season_id)
    .fetch_all(conn)
    .await
    .map_err(map_sqlx)?;
    Ok(rows.into_iter().map(Participant::from).collect())
}

async fn select_picks(
    conn: &mut PgConnection,
    season_id: SeasonId,
) -> Result<Vec<Pick>, DomainError> {
    let sql = format!(
        "SELECT {PICK_COLUMNS} FROM draft_picks WHERE season_id = $1 ORDER BY overall_pick_number"
    );
    let rows = sqlx::query_as::<_, PickRow>(&sql)
        .bind(season_id)
        .fetch_all(conn)
        .await
        .map_err(map_sqlx)?;
    Ok(rows.into_iter().map(Pick::from).collect())
}

/// PostgreSQL-backed draft store.
///
/// Placement reads the session row `FOR SHARE`, so picks never wait on each
/// other; the ledger's unique constraints decide races between them. Every
/// other write path locks the row `FOR UPDATE` and therefore cannot
/// interleave with an in-flight placement.
#[derive(Debug, Clone)]
pub struct PgDraftStore {
    pool: PgPool,
}

impl PgDraftStore {
    /// Creates a new `PgDraftStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftStore for PgDraftStore {
    async fn ensure_session(&self, season_id: SeasonId) -> Result<DraftSession, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx)?;
        insert_default_session(&mut conn, season_id).await?;
        select_session(&mut conn, season_id, None).await
    }

    async fn participants(&self, season_id: SeasonId) -> Result<Vec<Participant>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx)?;
        select_participants(&mut conn, season_id).await
    }

    async fn picks(&self, season_id: SeasonId) -> Result<Vec<Pick>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx)?;
        select_picks(&mut conn, season_id).await
    }

    async fn watchlist(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
    ) -> Result<Vec<ItemId>, DomainError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT item_id FROM draft_watchlist WHERE season_id = $1 AND team_id = $2 ORDER BY rank",
        )
        .bind(season_id)
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)
    }

    async fn begin(&self) -> Result<Box<dyn DraftTransaction>, DomainError> {
        let tx = self.pool.begin().await.map_err(map_sqlx)?;
        Ok(Box::new(PgDraftTransaction { tx }))
    }
}

/// A unit of work on [`PgDraftStore`]. Dropping it without committing rolls
/// it back.
pub struct PgDraftTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl DraftTransaction for PgDraftTransaction {
    async fn session(
        &mut self,
        season_id: SeasonId,
        lock: SessionLock,
    ) -> Result<DraftSession, DomainError> {
        insert_default_session(&mut self.tx, season_id).await?;
        select_session(&mut self.tx, season_id, Some(lock)).await
    }

    async fn save_session(&mut self, session: &DraftSession) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE draft_sessions SET status = $2, ordering_mode = $3, starts_at = $4, \
             pick_timer_seconds = $5, round_count = $6 WHERE season_id = $1",
        )
        .bind(session.season_id)
        .bind(session.status.as_str())
        .bind(session.ordering_mode.as_str())
        .bind(session.starts_at)
        .bind(session.pick_timer_seconds)
        .bind(session.round_count)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn participants(&mut self, season_id: SeasonId) -> Result<Vec<Participant>, DomainError> {
        select_participants(&mut self.tx, season_id).await
    }

    async fn insert_participants(
        &mut self,
        participants: &[Participant],
    ) -> Result<(), DomainError> {
        if participants.is_empty() {
            return Ok(());
        }
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO draft_participants (season_id, team_id, position, is_ready) ",
        );
        builder.push_values(participants, |mut row, p| {
            row.push_bind(p.season_id)
                .push_bind(p.team_id)
                .push_bind(p.position)
                .push_bind(p.is_ready);
        });
        builder.push(" ON CONFLICT (season_id, team_id) DO NOTHING");
        builder
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn assign_positions(
        &mut self,
        season_id: SeasonId,
        order: &[TeamId],
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE draft_participants AS p SET position = o.position::INTEGER \
             FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS o(team_id, position) \
             WHERE p.season_id = $1 AND p.team_id = o.team_id",
        )
        .bind(season_id)
        .bind(order)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() != order.len() as u64 {
            return Err(DomainError::Conflict(format!(
                "expected to reseat {} participants, reseated {}",
                order.len(),
                result.rows_affected()
            )));
        }
        Ok(())
    }

    async fn set_ready(
        &mut self,
        season_id: SeasonId,
        team_id: TeamId,
        is_ready: bool,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE draft_participants SET is_ready = $3 WHERE season_id = $1 AND team_id = $2",
        )
        .bind(season_id)
        .bind(team_id)
        .bind(is_ready)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("participant", team_id));
        }
        Ok(())
    }

    async fn picks(&mut self, season_id: SeasonId) -> Result<Vec<Pick>, DomainError> {
        select_picks(&mut self.tx, season_id).await
    }

    async fn insert_pick(&mut self, pick: &NewPick) -> Result<Pick, DomainError> {
        let sql = format!(
            "INSERT INTO draft_picks \
             (season_id, round, pick_in_round, overall_pick_number, team_id, item_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PICK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PickRow>(&sql)
            .bind(pick.season_id)
            .bind(pick.round)
            .bind(pick.pick_in_round)
            .bind(pick.overall_pick_number)
            .bind(pick.team_id)
            .bind(pick.item_id)
            .bind(pick.created_at)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        Ok(row.into())
    }

    async fn delete_pick(
        &mut self,
        season_id: SeasonId,
        pick_id: PickId,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM draft_picks WHERE season_id = $1 AND id = $2")
            .bind(season_id)
            .bind(pick_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Conflict(format!(
                "pick {pick_id} was already undone"
            )));
        }
        Ok(())
    }

    async fn replace_watchlist(
        &mut self,
        season_id: SeasonId,
        team_id: TeamId,
        item_ids: &[ItemId],
    ) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM draft_watchlist WHERE season_id = $1 AND team_id = $2")
            .bind(season_id)
            .bind(team_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        if item_ids.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO draft_watchlist (season_id, team_id, item_id, rank) ");
        builder.push_values(item_ids.iter().zip(1_i32..), |mut row, (item_id, rank)| {
            row.push_bind(season_id)
                .push_bind(team_id)
                .push_bind(*item_id)
                .push_bind(rank);
        });
        builder
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx.commit().await.map_err(map_sqlx)
    }
}
