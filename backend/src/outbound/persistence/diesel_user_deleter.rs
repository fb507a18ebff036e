//! Transactional soft delete of users and their group bindings.
//!
//! Binding removal and the status flip run in one transaction. Failures are
//! reported by step; any failure rolls back both statements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UserDeleter, UserDeletionError};
use crate::domain::{UserId, UserStatus};

use super::diesel_error_mapping;
use super::pool::{DbPool, PoolError};
use super::schema::{user_group_bindings, users};

/// Diesel-backed implementation of the `UserDeleter` port.
#[derive(Clone)]
pub struct DieselUserDeleter {
    pool: DbPool,
}

impl DieselUserDeleter {
    /// Create a new deleter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the transaction, tagged with the step that raised it.
#[derive(Debug)]
enum DeletionStep {
    Bindings(diesel::result::Error),
    Status(diesel::result::Error),
    Transaction(diesel::result::Error),
}

impl From<diesel::result::Error> for DeletionStep {
    fn from(error: diesel::result::Error) -> Self {
        Self::Transaction(error)
    }
}

fn map_pool_error(error: PoolError) -> UserDeletionError {
    diesel_error_mapping::map_pool_error(error, UserDeletionError::connection)
}

fn map_step_error(step: DeletionStep) -> UserDeletionError {
    let (error, constructor): (_, fn(&'static str) -> UserDeletionError) = match step {
        DeletionStep::Bindings(error) => (error, UserDeletionError::binding_removal),
        DeletionStep::Status(error) => (error, UserDeletionError::status_update),
        DeletionStep::Transaction(error) => (error, UserDeletionError::transaction),
    };
    diesel_error_mapping::map_diesel_error(error, constructor, UserDeletionError::connection)
}

#[async_trait]
impl UserDeleter for DieselUserDeleter {
    async fn delete_users(
        &self,
        user_ids: &[UserId],
        deleted_at: DateTime<Utc>,
    ) -> Result<(), UserDeletionError> {
        let ids: Vec<String> = user_ids.iter().map(|id| id.as_str().to_owned()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (bindings_removed, users_marked) = conn
            .transaction::<_, DeletionStep, _>(|conn| {
                async move {
                    let bindings_removed = diesel::delete(
                        user_group_bindings::table
                            .filter(user_group_bindings::user_id.eq_any(ids.clone())),
                    )
                    .execute(conn)
                    .await
                    .map_err(DeletionStep::Bindings)?;

                    let users_marked = diesel::update(users::table)
                        .filter(users::user_id.eq_any(ids))
                        .set((
                            users::status.eq(UserStatus::Deleted.as_str()),
                            users::status_time.eq(deleted_at),
                            users::update_time.eq(deleted_at),
                        ))
                        .execute(conn)
                        .await
                        .map_err(DeletionStep::Status)?;

                    Ok((bindings_removed, users_marked))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_step_error)?;

        debug!(bindings_removed, users_marked, "user deletion committed");
        Ok(())
    }
}
