//! Watchlist normalization.

use std::collections::HashSet;

use draftboard_core::error::DomainError;
use draftboard_core::model::ItemId;

use super::ensure_positive_id;

/// Maximum entries kept per team watchlist.
pub const WATCHLIST_CAP: usize = 200;

/// Validates ids, drops repeats (keeping first occurrence) and caps the list
/// at [`WATCHLIST_CAP`] entries. An empty list is valid and clears the
/// watchlist.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a non-positive id.
pub fn normalize_watchlist(item_ids: &[ItemId]) -> Result<Vec<ItemId>, DomainError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(item_ids.len().min(WATCHLIST_CAP));

    for item_id in item_ids {
        ensure_positive_id("item_id", *item_id)?;
        if seen.insert(*item_id) {
            normalized.push(*item_id);
        }
    }
    normalized.truncate(WATCHLIST_CAP);
    Ok(normalized)
}
