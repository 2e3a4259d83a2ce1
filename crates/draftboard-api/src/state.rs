//! Shared application state.

use std::sync::{Arc, Mutex};

use draftboard_core::clock::{Clock, SystemClock};
use draftboard_core::collaborators::{ItemCatalog, PermissionChecker, SeasonDirectory};
use draftboard_core::error::DomainError;
use draftboard_core::model::{SeasonId, UserId};
use draftboard_core::repository::DraftStore;
use draftboard_core::rng::{DeterministicRng, SystemRng};
use draftboard_engine::application::DraftContext;
use draftboard_engine::application::access;
use draftboard_engine::domain::actor::Actor;
use draftboard_store::pg_catalog::PgItemCatalog;
use draftboard_store::pg_directory::{PgPermissionChecker, PgSeasonDirectory};
use draftboard_store::pg_draft_store::PgDraftStore;
use sqlx::PgPool;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sessions, participants, picks and watchlists.
    pub store: Arc<dyn DraftStore>,
    /// Draftable items and bans.
    pub catalog: Arc<dyn ItemCatalog>,
    /// Season rosters and lifecycle notifications.
    pub directory: Arc<dyn SeasonDirectory>,
    /// Commissioner lookups.
    pub permissions: Arc<dyn PermissionChecker>,
    /// Clock used for pick timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG used for order rerolls.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn DraftStore>,
        catalog: Arc<dyn ItemCatalog>,
        directory: Arc<dyn SeasonDirectory>,
        permissions: Arc<dyn PermissionChecker>,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Self {
        Self {
            store,
            catalog,
            directory,
            permissions,
            clock,
            rng,
        }
    }

    /// Production state: every collaborator backed by `pool`, system clock,
    /// OS-seeded RNG.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
            Arc::new(Mutex::new(SystemRng::from_os()));
        Self::new(
            Arc::new(PgDraftStore::new(pool.clone())),
            Arc::new(PgItemCatalog::new(pool.clone())),
            Arc::new(PgSeasonDirectory::new(pool.clone())),
            Arc::new(PgPermissionChecker::new(pool)),
            Arc::new(SystemClock),
            rng,
        )
    }

    /// Borrows the collaborators for one engine call.
    #[must_use]
    pub fn context(&self) -> DraftContext<'_> {
        DraftContext {
            store: &*self.store,
            catalog: &*self.catalog,
            directory: &*self.directory,
            clock: &*self.clock,
        }
    }

    /// Resolves the caller's team and role in a season.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown season and
    /// `DomainError::Validation` for a non-positive season id.
    pub async fn actor(&self, season_id: SeasonId, user_id: UserId) -> Result<Actor, DomainError> {
        access::resolve_actor(season_id, user_id, &*self.directory, &*self.permissions).await
    }
}
