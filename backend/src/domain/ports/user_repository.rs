//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserChanges, UserId, UserQuery};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// An update matched no user row.
        NotFound { user_id: String } => "user {user_id} not found",
    }
}

/// Owner of write access to user rows (outside deletion).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user row.
    async fn insert(&self, user: &NewUser) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier, whatever its status.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Write the present fields of `changes` to the user row.
    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
    ) -> Result<(), UserPersistenceError>;

    /// Read one page of users matching `query`, honouring its sort and window.
    async fn list(&self, query: &UserQuery) -> Result<Vec<User>, UserPersistenceError>;

    /// Count every user matching the predicates of `query`.
    async fn count(&self, query: &UserQuery) -> Result<u64, UserPersistenceError>;
}
