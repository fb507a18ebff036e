//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Reads never select the password column. Page reads and counts share the
//! predicates built by [`super::user_filters`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    ExtraAttributes, NewUser, User, UserChanges, UserId, UserQuery, UserStatus,
};

use super::diesel_error_mapping;
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use super::user_filters::{filtered_users, ordered_page};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    diesel_error_mapping::map_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    diesel_error_mapping::map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn encode_extra(extra: &ExtraAttributes) -> Result<String, UserPersistenceError> {
    serde_json::to_string(extra)
        .map_err(|err| UserPersistenceError::query(format!("encode extra attributes: {err}")))
}

/// Empty or malformed stored attributes decode to an empty map.
fn decode_extra(user_id: &str, raw: &str) -> ExtraAttributes {
    if raw.trim().is_empty() {
        return ExtraAttributes::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!(user_id, error = %err, "unreadable extra attributes, treating as empty");
        ExtraAttributes::new()
    })
}

/// Convert a database row to a domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let extra = decode_extra(&row.user_id, &row.extra);
    let status: UserStatus = row
        .status
        .parse()
        .map_err(|err| UserPersistenceError::query(format!("stored user status: {err}")))?;
    let user_id = UserId::new(&row.user_id)
        .map_err(|err| UserPersistenceError::query(format!("stored user id: {err}")))?;

    Ok(User {
        user_id,
        username: row.username,
        email: row.email,
        phone_number: row.phone_number,
        description: row.description,
        extra,
        status,
        status_changed_at: row.status_time,
        created_at: row.create_time,
        updated_at: row.update_time,
    })
}

fn changeset(changes: &UserChanges) -> Result<UserChangeset<'_>, UserPersistenceError> {
    Ok(UserChangeset {
        username: changes.username.as_deref(),
        email: changes.email.as_deref(),
        phone_number: changes.phone_number.as_deref(),
        description: changes.description.as_deref(),
        extra: changes.extra.as_ref().map(encode_extra).transpose()?,
        update_time: changes.updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<(), UserPersistenceError> {
        let new_row = NewUserRow {
            user_id: user.user_id.as_str(),
            username: &user.username,
            email: &user.email,
            phone_number: &user.phone_number,
            description: &user.description,
            password: user.password.expose(),
            extra: encode_extra(&user.extra)?,
            status: UserStatus::Active.as_str(),
            status_time: user.created_at,
            create_time: user.created_at,
            update_time: user.created_at,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::user_id.eq(id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
    ) -> Result<(), UserPersistenceError> {
        let update = changeset(changes)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated_rows = diesel::update(users::table)
            .filter(users::user_id.eq(id.as_str()))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated_rows == 0 {
            return Err(UserPersistenceError::not_found(id.as_str()));
        }
        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = ordered_page(filtered_users(query), query)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn count(&self, query: &UserQuery) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered_users(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(total)
            .map_err(|_| UserPersistenceError::query("negative user count returned"))
    }
}
