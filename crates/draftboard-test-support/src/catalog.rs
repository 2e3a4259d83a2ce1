//! Test catalog: a fixed, in-memory `ItemCatalog`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use draftboard_core::collaborators::{CatalogItem, CatalogPage, ItemCatalog, PoolQuery};
use draftboard_core::error::DomainError;
use draftboard_core::model::{ItemId, SeasonId};

/// Builds a catalog item with no role.
#[must_use]
pub fn catalog_item(item_id: ItemId, name: &str, item_types: &[&str], cost: Option<i32>) -> CatalogItem {
    CatalogItem {
        item_id,
        name: name.to_owned(),
        item_types: item_types.iter().map(|t| (*t).to_owned()).collect(),
        role: None,
        cost,
        banned: false,
    }
}

/// A catalog backed by a fixed item list and a set of per-season bans.
/// Counts `browse` calls so tests can assert scan bounds.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
    bans: HashSet<(SeasonId, ItemId)>,
    browse_calls: AtomicUsize,
}

impl StaticCatalog {
    /// Creates a catalog from `items`; they are served ordered by id.
    #[must_use]
    pub fn new(mut items: Vec<CatalogItem>) -> Self {
        items.sort_by_key(|item| item.item_id);
        Self {
            items,
            ..Self::default()
        }
    }

    /// Creates `count` draftable items with ids `1..=count` named `Creature {id}`.
    #[must_use]
    pub fn numbered(count: i64) -> Self {
        Self::new(
            (1..=count)
                .map(|id| catalog_item(id, &format!("Creature {id}"), &["normal"], Some(1)))
                .collect(),
        )
    }

    /// Bans `item_id` in `season_id`.
    #[must_use]
    pub fn with_ban(mut self, season_id: SeasonId, item_id: ItemId) -> Self {
        self.bans.insert((season_id, item_id));
        self
    }

    /// Number of `browse` calls served so far.
    pub fn browse_calls(&self) -> usize {
        self.browse_calls.load(Ordering::SeqCst)
    }

    fn seen_from(&self, season_id: SeasonId, item: &CatalogItem) -> CatalogItem {
        CatalogItem {
            banned: self.bans.contains(&(season_id, item.item_id)),
            ..item.clone()
        }
    }

    fn matches(item: &CatalogItem, query: &PoolQuery) -> bool {
        let search_ok = query.search.as_ref().is_none_or(|needle| {
            item.name.to_lowercase().contains(&needle.to_lowercase())
        });
        let type_ok = query
            .item_type
            .as_ref()
            .is_none_or(|wanted| item.item_types.iter().any(|t| t == wanted));
        let role_ok = query
            .role
            .as_ref()
            .is_none_or(|wanted| item.role.as_ref() == Some(wanted));
        search_ok && type_ok && role_ok
    }
}

#[async_trait]
impl ItemCatalog for StaticCatalog {
    async fn item(
        &self,
        season_id: SeasonId,
        item_id: ItemId,
    ) -> Result<Option<CatalogItem>, DomainError> {
        Ok(self
            .items
            .iter()
            .find(|item| item.item_id == item_id)
            .map(|item| self.seen_from(season_id, item)))
    }

    async fn items(
        &self,
        season_id: SeasonId,
        item_ids: &[ItemId],
    ) -> Result<Vec<CatalogItem>, DomainError> {
        Ok(self
            .items
            .iter()
            .filter(|item| item_ids.contains(&item.item_id))
            .map(|item| self.seen_from(season_id, item))
            .collect())
    }

    async fn browse(
        &self,
        season_id: SeasonId,
        query: &PoolQuery,
    ) -> Result<CatalogPage, DomainError> {
        self.browse_calls.fetch_add(1, Ordering::SeqCst);
        let matching: Vec<&CatalogItem> = self
            .items
            .iter()
            .filter(|item| Self::matches(item, query))
            .collect();
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let page_size = usize::try_from(query.page_size).unwrap_or(usize::MAX);
        Ok(CatalogPage {
            total: matching.len() as u64,
            items: matching
                .into_iter()
                .skip(offset)
                .take(page_size)
                .map(|item| self.seen_from(season_id, item))
                .collect(),
        })
    }
}
