//! Driving port for user directory operations.
//!
//! Whatever transport fronts the directory calls this port; the request and
//! response types are transport agnostic.

use async_trait::async_trait;
use pagination::{Page, SortDirection};
use serde::Serialize;

use crate::domain::{Error, ExtraAttributes, Password, User, UserId, UserSortColumn, UserWithGroups};

/// Request to create a user.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    /// Login name.
    pub username: String,
    /// Email address; simplified before storage.
    pub email: String,
    /// Phone number; simplified before storage.
    pub phone_number: String,
    /// Free-form description.
    pub description: String,
    /// Secret to store.
    pub password: Password,
    /// Open key/value attributes.
    pub extra: ExtraAttributes,
}

/// Response for a created user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    /// Identifier assigned to the new user.
    pub user_id: UserId,
}

/// Request to soft-delete users.
#[derive(Debug, Clone, Default)]
pub struct DeleteUsersRequest {
    /// Raw identifiers; normalised before use and required to be non-empty.
    pub user_ids: Vec<String>,
}

/// Response for a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUsersResponse {
    /// Normalised identifiers that were targeted.
    pub user_ids: Vec<UserId>,
}

/// Partial update of a user.
///
/// `None` and empty values leave the stored field untouched.
#[derive(Debug, Clone)]
pub struct ModifyUserRequest {
    /// User to modify.
    pub user_id: UserId,
    /// Replacement login name.
    pub username: Option<String>,
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement phone number.
    pub phone_number: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement extra attributes.
    pub extra: Option<ExtraAttributes>,
}

impl ModifyUserRequest {
    /// A request touching no fields of `user_id`.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            username: None,
            email: None,
            phone_number: None,
            description: None,
            extra: None,
        }
    }
}

/// Response for a modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyUserResponse {
    /// Identifier of the modified user.
    pub user_id: UserId,
}

/// Loosely specified list request.
///
/// Every list field is optional: an empty list means "no filter on this
/// field", never "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUsersRequest {
    /// Restrict to members of any of these groups.
    pub group_ids: Vec<String>,
    /// Restrict to these user ids.
    pub user_ids: Vec<String>,
    /// Restrict to these usernames.
    pub usernames: Vec<String>,
    /// Restrict to these emails.
    pub emails: Vec<String>,
    /// Restrict to these phone numbers.
    pub phone_numbers: Vec<String>,
    /// Restrict to these statuses, e.g. `active`.
    pub statuses: Vec<String>,
    /// Case-insensitive substring matched against username, email and
    /// phone number.
    pub search_word: Option<String>,
    /// Sort column; creation time when absent.
    pub sort_key: Option<UserSortColumn>,
    /// Sort direction; descending when absent.
    pub sort_direction: Option<SortDirection>,
    /// Requested page size.
    pub limit: Option<i64>,
    /// Requested number of rows to skip.
    pub offset: Option<i64>,
}

/// Directory operations exposed to driving adapters.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user and return its new identifier.
    async fn create_user(&self, request: CreateUserRequest) -> Result<CreateUserResponse, Error>;

    /// Soft-delete users and drop their group bindings atomically.
    async fn delete_users(
        &self,
        request: DeleteUsersRequest,
    ) -> Result<DeleteUsersResponse, Error>;

    /// Apply a partial update to an existing user.
    async fn modify_user(&self, request: ModifyUserRequest) -> Result<ModifyUserResponse, Error>;

    /// Fetch one user.
    async fn get_user(&self, user_id: &UserId) -> Result<User, Error>;

    /// Fetch one user with its groups.
    async fn get_user_with_group(&self, user_id: &UserId) -> Result<UserWithGroups, Error>;

    /// List a page of users plus the total match count.
    async fn list_users(&self, request: ListUsersRequest) -> Result<Page<User>, Error>;

    /// List a page of users, each enriched with its groups.
    async fn list_users_with_group(
        &self,
        request: ListUsersRequest,
    ) -> Result<Page<UserWithGroups>, Error>;
}
