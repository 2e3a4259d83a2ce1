//! Draftboard: turn-based draft bounded context.
//!
//! Responsible for the draft session lifecycle, the derived turn order, the
//! concurrency-safe pick placement protocol, commissioner overrides and the
//! read models built over the pick ledger.

pub mod application;
pub mod domain;
