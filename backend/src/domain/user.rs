//! User data model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::Group;

/// Prefix carried by every generated user identifier.
pub const USER_ID_PREFIX: &str = "usr-";

/// Validation errors raised by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier carried leading or trailing whitespace.
    #[error("user id must not contain surrounding whitespace")]
    PaddedId,
    /// The status string is not a known lifecycle state.
    #[error("unknown user status: {0}")]
    UnknownStatus(String),
}

/// Stable user identifier, assigned at creation and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a fresh identifier of the form `usr-<32 hex digits>`.
    pub fn generate() -> Self {
        Self(format!("{USER_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::PaddedId);
        }
        Ok(Self(id))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Lifecycle state of a user record.
///
/// `Deleted` is terminal: nothing in this crate moves a user out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Regular, usable account.
    #[default]
    Active,
    /// Temporarily blocked by an administrator.
    Disabled,
    /// Soft-deleted; the row remains for id lookups.
    Deleted,
}

impl UserStatus {
    /// Column value stored in the `users.status` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "disabled" => Ok(Self::Disabled),
            "deleted" => Ok(Self::Deleted),
            other => Err(UserValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Open key/value attributes, stored as JSON text.
pub type ExtraAttributes = BTreeMap<String, String>;

/// Secret supplied at creation. Never part of a returned [`User`].
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wrap a raw password.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the secret for persistence.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Directory user as returned to callers.
///
/// The stored password is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Lowercased, trimmed email address.
    pub email: String,
    /// Lowercased, trimmed phone number.
    pub phone_number: String,
    /// Free-form description.
    pub description: String,
    /// Open key/value attributes.
    pub extra: ExtraAttributes,
    /// Lifecycle state.
    pub status: UserStatus,
    /// When `status` last changed.
    pub status_changed_at: DateTime<Utc>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last modification instant.
    pub updated_at: DateTime<Utc>,
}

/// Fully prepared record for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Freshly assigned identifier.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Simplified email address.
    pub email: String,
    /// Simplified phone number.
    pub phone_number: String,
    /// Free-form description.
    pub description: String,
    /// Secret to store.
    pub password: Password,
    /// Open key/value attributes.
    pub extra: ExtraAttributes,
    /// Creation instant, also used for the update and status times.
    pub created_at: DateTime<Utc>,
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// Replacement login name.
    pub username: Option<String>,
    /// Replacement email, already simplified.
    pub email: Option<String>,
    /// Replacement phone number, already simplified.
    pub phone_number: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement extra attributes.
    pub extra: Option<ExtraAttributes>,
    /// Modification instant, always written.
    pub updated_at: DateTime<Utc>,
}

impl UserChanges {
    /// Apply the present fields to an in-memory user.
    ///
    /// Mirrors what persistence adapters write, so doubles stay faithful.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username.clone_from(username);
        }
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(phone_number) = &self.phone_number {
            user.phone_number.clone_from(phone_number);
        }
        if let Some(description) = &self.description {
            user.description.clone_from(description);
        }
        if let Some(extra) = &self.extra {
            user.extra.clone_from(extra);
        }
        user.updated_at = self.updated_at;
    }
}

/// A user enriched with the groups it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithGroups {
    /// The user record.
    pub user: User,
    /// Groups reachable through membership bindings.
    pub groups: Vec<Group>,
}
