//! PostgreSQL-backed group membership resolution.
//!
//! Both lookups go through `user_group_bindings`; an empty input list
//! returns an empty result without touching the database.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{GroupMembershipError, GroupMembershipRepository};
use crate::domain::{Group, GroupId, UserId};

use super::diesel_error_mapping;
use super::models::GroupRow;
use super::pool::{DbPool, PoolError};
use super::schema::{groups, user_group_bindings};

/// Diesel-backed implementation of the `GroupMembershipRepository` port.
#[derive(Clone)]
pub struct DieselGroupMembershipRepository {
    pool: DbPool,
}

impl DieselGroupMembershipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupMembershipError {
    diesel_error_mapping::map_pool_error(error, GroupMembershipError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> GroupMembershipError {
    diesel_error_mapping::map_diesel_error(
        error,
        GroupMembershipError::query,
        GroupMembershipError::connection,
    )
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Self {
            group_id: GroupId::new(row.group_id),
            name: row.name,
            description: row.description,
            status: row.status,
        }
    }
}

/// Bindings may reference ids written by other collaborators; malformed ones
/// are skipped.
fn member_ids(raw: Vec<String>) -> Vec<UserId> {
    raw.into_iter()
        .filter_map(|id| match UserId::new(&id) {
            Ok(user_id) => Some(user_id),
            Err(err) => {
                warn!(user_id = %id, error = %err, "skipping malformed binding user id");
                None
            }
        })
        .collect()
}

#[async_trait]
impl GroupMembershipRepository for DieselGroupMembershipRepository {
    async fn groups_for_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<Group>, GroupMembershipError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = user_ids.iter().map(|id| id.as_str().to_owned()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GroupRow> = user_group_bindings::table
            .inner_join(groups::table)
            .filter(user_group_bindings::user_id.eq_any(ids))
            .select(GroupRow::as_select())
            .distinct()
            .order(groups::group_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    async fn user_ids_for_groups(
        &self,
        group_ids: &[GroupId],
    ) -> Result<Vec<UserId>, GroupMembershipError> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = group_ids.iter().map(|id| id.as_str().to_owned()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let raw: Vec<String> = user_group_bindings::table
            .filter(user_group_bindings::group_id.eq_any(ids))
            .select(user_group_bindings::user_id)
            .distinct()
            .order(user_group_bindings::user_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(member_ids(raw))
    }
}
