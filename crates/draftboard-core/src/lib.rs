//! Draftboard Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and record types that the draft
//! engine, its storage adapters and its test doubles depend on. It contains no
//! infrastructure code.

pub mod clock;
pub mod collaborators;
pub mod command;
pub mod error;
pub mod model;
pub mod repository;
pub mod rng;
