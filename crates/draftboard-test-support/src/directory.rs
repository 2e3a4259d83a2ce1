//! Test directory and permissions: fixed `SeasonDirectory` and
//! `PermissionChecker` implementations.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use draftboard_core::collaborators::{PermissionChecker, SeasonDirectory, TeamSummary};
use draftboard_core::error::DomainError;
use draftboard_core::model::{LeagueId, SeasonId, TeamId, UserId};

/// A directory with a fixed roster that records lifecycle notifications.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    leagues: HashMap<SeasonId, LeagueId>,
    teams: HashMap<SeasonId, Vec<TeamSummary>>,
    managers: HashMap<(SeasonId, UserId), TeamId>,
    notifications: Mutex<Vec<(SeasonId, &'static str)>>,
}

impl StaticDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a season under a league.
    #[must_use]
    pub fn with_season(mut self, season_id: SeasonId, league_id: LeagueId) -> Self {
        self.leagues.insert(season_id, league_id);
        self
    }

    /// Registers a team managed by `manager`.
    #[must_use]
    pub fn with_team(
        mut self,
        season_id: SeasonId,
        team_id: TeamId,
        name: &str,
        manager: UserId,
    ) -> Self {
        let teams = self.teams.entry(season_id).or_default();
        teams.push(TeamSummary {
            team_id,
            name: name.to_owned(),
        });
        teams.sort_by_key(|t| t.team_id);
        self.managers.insert((season_id, manager), team_id);
        self
    }

    /// Lifecycle notifications received so far, as `(season, "drafting" | "active")`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn notifications(&self) -> Vec<(SeasonId, &'static str)> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeasonDirectory for StaticDirectory {
    async fn league_for_season(
        &self,
        season_id: SeasonId,
    ) -> Result<Option<LeagueId>, DomainError> {
        Ok(self.leagues.get(&season_id).copied())
    }

    async fn teams(&self, season_id: SeasonId) -> Result<Vec<TeamSummary>, DomainError> {
        Ok(self.teams.get(&season_id).cloned().unwrap_or_default())
    }

    async fn team_for_user(
        &self,
        season_id: SeasonId,
        user_id: UserId,
    ) -> Result<Option<TeamId>, DomainError> {
        Ok(self.managers.get(&(season_id, user_id)).copied())
    }

    async fn mark_drafting(&self, season_id: SeasonId) -> Result<(), DomainError> {
        self.notifications
            .lock()
            .unwrap()
            .push((season_id, "drafting"));
        Ok(())
    }

    async fn mark_active(&self, season_id: SeasonId) -> Result<(), DomainError> {
        self.notifications.lock().unwrap().push((season_id, "active"));
        Ok(())
    }
}

/// A permission checker with a fixed set of league commissioners.
#[derive(Debug, Default)]
pub struct StaticPermissions {
    commissioners: HashSet<(LeagueId, UserId)>,
}

impl StaticPermissions {
    /// Creates a checker where nobody is a commissioner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `user_id` the commissioner role in `league_id`.
    #[must_use]
    pub fn with_commissioner(mut self, league_id: LeagueId, user_id: UserId) -> Self {
        self.commissioners.insert((league_id, user_id));
        self
    }
}

#[async_trait]
impl PermissionChecker for StaticPermissions {
    async fn is_commissioner(
        &self,
        league_id: LeagueId,
        user_id: UserId,
    ) -> Result<bool, DomainError> {
        Ok(self.commissioners.contains(&(league_id, user_id)))
    }
}
