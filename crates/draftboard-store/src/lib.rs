//! Draftboard Store: `PostgreSQL` adapters for the draft engine.
//!
//! Implements the store and collaborator traits from `draftboard-core` with
//! `sqlx`. Uniqueness violations on the pick ledger surface as
//! `DomainError::Conflict`; every other database failure is
//! `DomainError::Infrastructure`.

mod errors;
pub mod pg_catalog;
pub mod pg_directory;
pub mod pg_draft_store;
