//! Internal Diesel row structs for directory tables.
//!
//! These types never leave the persistence layer; adapters convert them to
//! domain values before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{groups, users};

/// Readable projection of the users table. The password column is left out.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,
    pub extra: String,
    pub status: String,
    pub status_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// Insertable struct for new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub description: &'a str,
    pub password: &'a str,
    pub extra: String,
    pub status: &'a str,
    pub status_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// Partial update of a user row; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub description: Option<&'a str>,
    pub extra: Option<String>,
    pub update_time: DateTime<Utc>,
}

/// Row struct for reading from the groups table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub group_id: String,
    pub name: String,
    pub description: String,
    pub status: String,
}
