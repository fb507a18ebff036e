//! User directory core: query, mutation and membership resolution.
//!
//! The crate follows a ports-and-adapters layout. `domain` holds the user
//! and group model, the list query builder and the directory service;
//! `outbound::persistence` implements the persistence ports with Diesel on
//! PostgreSQL.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::DirectorySettings;
