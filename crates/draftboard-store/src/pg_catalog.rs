//! `PostgreSQL` implementation of `ItemCatalog` over `catalog_items` and
//! `season_item_bans`.

use async_trait::async_trait;
use draftboard_core::collaborators::{CatalogItem, CatalogPage, ItemCatalog, PoolQuery};
use draftboard_core::error::DomainError;
use draftboard_core::model::{ItemId, SeasonId};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::errors::map_sqlx;

const ITEM_SELECT: &str = "SELECT c.item_id, c.name, c.item_types, c.role, c.cost, \
     EXISTS (SELECT 1 FROM season_item_bans b WHERE b.season_id = $1 AND b.item_id = c.item_id) \
     AS banned FROM catalog_items c";

#[derive(sqlx::FromRow)]
struct CatalogRow {
    item_id: i64,
    name: String,
    item_types: Vec<String>,
    role: Option<String>,
    cost: Option<i32>,
    banned: bool,
}

impl From<CatalogRow> for CatalogItem {
    fn from(row: CatalogRow) -> Self {
        Self {
            item_id: row.item_id,
            name: row.name,
            item_types: row.item_types,
            role: row.role,
            cost: row.cost,
            banned: row.banned,
        }
    }
}

/// Escapes `LIKE` wildcards so a search matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Appends the pool filters; `builder` must already end inside a `WHERE`.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PoolQuery) {
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        builder
            .push(" AND c.name ILIKE ")
            .push_bind(like_pattern(search.trim()));
    }
    if let Some(item_type) = &query.item_type {
        builder
            .push(" AND ")
            .push_bind(item_type.clone())
            .push(" = ANY (c.item_types)");
    }
    if let Some(role) = &query.role {
        builder.push(" AND c.role = ").push_bind(role.clone());
    }
}

/// PostgreSQL-backed item catalog.
#[derive(Debug, Clone)]
pub struct PgItemCatalog {
    pool: PgPool,
}

impl PgItemCatalog {
    /// Creates a new `PgItemCatalog`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemCatalog for PgItemCatalog {
    async fn item(
        &self,
        season_id: SeasonId,
        item_id: ItemId,
    ) -> Result<Option<CatalogItem>, DomainError> {
        let sql = format!("{ITEM_SELECT} WHERE c.item_id = $2");
        let row = sqlx::query_as::<_, CatalogRow>(&sql)
            .bind(season_id)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(CatalogItem::from))
    }

    async fn items(
        &self,
        season_id: SeasonId,
        item_ids: &[ItemId],
    ) -> Result<Vec<CatalogItem>, DomainError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("{ITEM_SELECT} WHERE c.item_id = ANY ($2) ORDER BY c.item_id");
        let rows = sqlx::query_as::<_, CatalogRow>(&sql)
            .bind(season_id)
            .bind(item_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(CatalogItem::from).collect())
    }

    async fn browse(
        &self,
        season_id: SeasonId,
        query: &PoolQuery,
    ) -> Result<CatalogPage, DomainError> {
        let mut count: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM catalog_items c WHERE TRUE");
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let mut page: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT c.item_id, c.name, c.item_types, c.role, c.cost, \
             EXISTS (SELECT 1 FROM season_item_bans b WHERE b.season_id = ",
        );
        page.push_bind(season_id)
            .push(" AND b.item_id = c.item_id) AS banned FROM catalog_items c WHERE TRUE");
        push_filters(&mut page, query);
        page.push(" ORDER BY c.item_id LIMIT ")
            .push_bind(i64::from(query.page_size))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));
        let rows: Vec<CatalogRow> = page
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(CatalogPage {
            items: rows.into_iter().map(CatalogItem::from).collect(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pika"), "%pika%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
    }

    #[test]
    fn test_filters_bind_each_supplied_field() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1 WHERE TRUE");
        let query = PoolQuery {
            search: Some(" char ".to_owned()),
            item_type: Some("fire".to_owned()),
            role: None,
            ..PoolQuery::page(1, 10)
        };

        push_filters(&mut builder, &query);

        assert_eq!(
            builder.sql(),
            "SELECT 1 WHERE TRUE AND c.name ILIKE $1 AND $2 = ANY (c.item_types)"
        );
    }
}
