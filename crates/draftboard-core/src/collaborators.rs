//! Interfaces the draft engine consumes from neighbouring services.
//!
//! The item catalog, the season directory and the permission checker are
//! injected into the engine rather than reached through globals.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::model::{ItemId, LeagueId, SeasonId, TeamId, UserId};

/// A draftable creature as seen from one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Catalog identifier.
    pub item_id: ItemId,
    /// Display name.
    pub name: String,
    /// Elemental types, e.g. `["fire", "flying"]`.
    pub item_types: Vec<String>,
    /// Optional competitive role tag.
    pub role: Option<String>,
    /// Draft cost; items without a cost are not draftable.
    pub cost: Option<i32>,
    /// Banned for the season the item was fetched for.
    pub banned: bool,
}

impl CatalogItem {
    /// Items without a defined cost cannot be drafted.
    #[must_use]
    pub fn is_draftable(&self) -> bool {
        self.cost.is_some()
    }
}

/// Browse parameters passed through to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolQuery {
    /// Case-insensitive name substring.
    pub search: Option<String>,
    /// Exact type filter.
    pub item_type: Option<String>,
    /// Exact role filter.
    pub role: Option<String>,
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl PoolQuery {
    /// An unfiltered page.
    #[must_use]
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }

    /// Row offset of the first item on the page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of catalog items, ordered by item id.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    /// Items on this page.
    pub items: Vec<CatalogItem>,
    /// Total matches across all pages.
    pub total: u64,
}

/// Read access to the item catalog.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Looks up one item, with ban status for `season_id`.
    async fn item(
        &self,
        season_id: SeasonId,
        item_id: ItemId,
    ) -> Result<Option<CatalogItem>, DomainError>;

    /// Looks up several items; ids that do not exist are absent from the result.
    async fn items(
        &self,
        season_id: SeasonId,
        item_ids: &[ItemId],
    ) -> Result<Vec<CatalogItem>, DomainError>;

    /// Returns one page of items matching `query`.
    async fn browse(
        &self,
        season_id: SeasonId,
        query: &PoolQuery,
    ) -> Result<CatalogPage, DomainError>;
}

/// A team registered in a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSummary {
    /// Team identifier.
    pub team_id: TeamId,
    /// Display name.
    pub name: String,
}

/// The season/team directory, which also owns the season lifecycle status.
#[async_trait]
pub trait SeasonDirectory: Send + Sync {
    /// Resolves the league a season belongs to, `None` if the season is unknown.
    async fn league_for_season(&self, season_id: SeasonId)
    -> Result<Option<LeagueId>, DomainError>;

    /// Teams in the season, ordered by team id.
    async fn teams(&self, season_id: SeasonId) -> Result<Vec<TeamSummary>, DomainError>;

    /// The team `user_id` manages in `season_id`, if any.
    async fn team_for_user(
        &self,
        season_id: SeasonId,
        user_id: UserId,
    ) -> Result<Option<TeamId>, DomainError>;

    /// Notifies the directory that drafting began.
    async fn mark_drafting(&self, season_id: SeasonId) -> Result<(), DomainError>;

    /// Notifies the directory that the draft finished and the season is active.
    async fn mark_active(&self, season_id: SeasonId) -> Result<(), DomainError>;
}

/// League role checks.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// `true` if `user_id` is an owner or commissioner of the league, or a superadmin.
    async fn is_commissioner(
        &self,
        league_id: LeagueId,
        user_id: UserId,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_query_offset_is_zero_based() {
        assert_eq!(PoolQuery::page(1, 100).offset(), 0);
        assert_eq!(PoolQuery::page(3, 25).offset(), 50);
        assert_eq!(PoolQuery::page(0, 25).offset(), 0);
    }

    #[test]
    fn test_item_without_cost_is_not_draftable() {
        let item = CatalogItem {
            item_id: 1,
            name: "Missingno".to_owned(),
            item_types: vec![],
            role: None,
            cost: None,
            banned: false,
        };

        assert!(!item.is_draftable());
    }
}
