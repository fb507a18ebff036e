//! Port for resolving user/group membership bindings.
use async_trait::async_trait;

use crate::domain::{Group, GroupId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by membership resolution adapters.
    pub enum GroupMembershipError {
        /// Repository connection could not be established.
        Connection { message: String } => "group membership connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "group membership query failed: {message}",
    }
}

/// Read-only projections over the user/group binding relation.
///
/// Both directions return de-duplicated results; empty input yields an
/// empty result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupMembershipRepository: Send + Sync {
    /// Groups any of `user_ids` belongs to.
    async fn groups_for_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<Group>, GroupMembershipError>;

    /// Users belonging to any of `group_ids`.
    async fn user_ids_for_groups(
        &self,
        group_ids: &[GroupId],
    ) -> Result<Vec<UserId>, GroupMembershipError>;
}
