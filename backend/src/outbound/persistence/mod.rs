//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Adapters only translate between Diesel rows and domain types; row structs
//! (`models`) and table definitions (`schema`) stay private to this module.
//! Connections come from a shared [`DbPool`] backed by `bb8`.
//!
//! ```rust,no_run
//! use directory_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/directory")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_group_membership_repository;
mod diesel_user_deleter;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;
mod user_filters;

pub use diesel_group_membership_repository::DieselGroupMembershipRepository;
pub use diesel_user_deleter::DieselUserDeleter;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
