//! Application services for the draft context.

pub mod access;
pub mod command_handlers;
pub mod export;
mod placement;
pub mod query_handlers;

use draftboard_core::clock::Clock;
use draftboard_core::collaborators::{ItemCatalog, SeasonDirectory};
use draftboard_core::repository::DraftStore;

/// The collaborators every draft operation runs against.
#[derive(Clone, Copy)]
pub struct DraftContext<'a> {
    /// Sessions, participants, picks and watchlists.
    pub store: &'a dyn DraftStore,
    /// Draftable items and per-season bans.
    pub catalog: &'a dyn ItemCatalog,
    /// Season rosters and lifecycle notifications.
    pub directory: &'a dyn SeasonDirectory,
    /// Source of pick timestamps.
    pub clock: &'a dyn Clock,
}
