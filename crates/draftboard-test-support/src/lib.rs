//! Shared test doubles for the Draftboard draft engine.

mod catalog;
mod clock;
mod directory;
mod rng;
mod store;

pub use catalog::{StaticCatalog, catalog_item};
pub use clock::FixedClock;
pub use directory::{StaticDirectory, StaticPermissions};
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingDraftStore, InMemoryDraftStore};
