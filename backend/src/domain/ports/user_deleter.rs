//! Port for the atomic soft delete of users and their bindings.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by the transactional deleter. Any variant means nothing
    /// was committed.
    pub enum UserDeletionError {
        /// Repository connection could not be established.
        Connection { message: String } => "user deletion connection failed: {message}",
        /// Removing membership bindings failed.
        BindingRemoval { message: String } => "removing group bindings failed: {message}",
        /// Marking users deleted failed.
        StatusUpdate { message: String } => "updating user status failed: {message}",
        /// Beginning or committing the transaction failed.
        Transaction { message: String } => "user deletion transaction failed: {message}",
    }
}

/// Soft-deletes users in one unit of work.
///
/// Implementations remove every binding referencing the ids, then set the
/// users' status to deleted and stamp status and update times with
/// `deleted_at`, committing both or neither.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDeleter: Send + Sync {
    /// Delete bindings and flip status for `user_ids` atomically.
    async fn delete_users(
        &self,
        user_ids: &[UserId],
        deleted_at: DateTime<Utc>,
    ) -> Result<(), UserDeletionError>;
}
