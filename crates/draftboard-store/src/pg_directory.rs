//! `PostgreSQL` implementations of `SeasonDirectory` and `PermissionChecker`
//! over the league service's `seasons`, `teams`, `league_members` and
//! `users` tables.

use async_trait::async_trait;
use draftboard_core::collaborators::{PermissionChecker, SeasonDirectory, TeamSummary};
use draftboard_core::error::DomainError;
use draftboard_core::model::{LeagueId, SeasonId, TeamId, UserId};
use sqlx::PgPool;
use tracing::info;

use crate::errors::map_sqlx;

#[derive(sqlx::FromRow)]
struct TeamRow {
    team_id: i64,
    name: String,
}

/// PostgreSQL-backed season directory.
#[derive(Debug, Clone)]
pub struct PgSeasonDirectory {
    pool: PgPool,
}

impl PgSeasonDirectory {
    /// Creates a new `PgSeasonDirectory`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_season_status(
        &self,
        season_id: SeasonId,
        status: &'static str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE seasons SET status = $2 WHERE season_id = $1")
            .bind(season_id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("season", season_id));
        }
        info!(season_id, status, "season status updated");
        Ok(())
    }
}

#[async_trait]
impl SeasonDirectory for PgSeasonDirectory {
    async fn league_for_season(
        &self,
        season_id: SeasonId,
    ) -> Result<Option<LeagueId>, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT league_id FROM seasons WHERE season_id = $1")
            .bind(season_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn teams(&self, season_id: SeasonId) -> Result<Vec<TeamSummary>, DomainError> {
        let rows = sqlx::query_as::<_, TeamRow>(
            "SELECT team_id, name FROM teams WHERE season_id = $1 ORDER BY team_id",
        )
        .bind(season_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(rows
            .into_iter()
            .map(|row| TeamSummary {
                team_id: row.team_id,
                name: row.name,
            })
            .collect())
    }

    async fn team_for_user(
        &self,
        season_id: SeasonId,
        user_id: UserId,
    ) -> Result<Option<TeamId>, DomainError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT team_id FROM teams WHERE season_id = $1 AND manager_user_id = $2 \
             ORDER BY team_id LIMIT 1",
        )
        .bind(season_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)
    }

    async fn mark_drafting(&self, season_id: SeasonId) -> Result<(), DomainError> {
        self.set_season_status(season_id, "drafting").await
    }

    async fn mark_active(&self, season_id: SeasonId) -> Result<(), DomainError> {
        self.set_season_status(season_id, "active").await
    }
}

/// League owners, league commissioners and superadmins may run the draft.
#[derive(Debug, Clone)]
pub struct PgPermissionChecker {
    pool: PgPool,
}

impl PgPermissionChecker {
    /// Creates a new `PgPermissionChecker`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionChecker for PgPermissionChecker {
    async fn is_commissioner(
        &self,
        league_id: LeagueId,
        user_id: UserId,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM league_members \
                            WHERE league_id = $1 AND user_id = $2 \
                              AND role IN ('owner', 'commissioner')) \
                 OR EXISTS (SELECT 1 FROM users WHERE user_id = $2 AND is_superadmin)",
        )
        .bind(league_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)
    }
}
