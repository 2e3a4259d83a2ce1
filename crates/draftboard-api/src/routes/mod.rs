//! Route modules.

pub mod admin;
pub mod draft;
pub mod health;

#[cfg(test)]
mod testing;
