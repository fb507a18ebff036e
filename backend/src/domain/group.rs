//! Group references resolved through membership bindings.
//!
//! Groups are owned by another component; the directory only reads them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Wrap an identifier without validation; groups are validated upstream.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group identifier.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Lifecycle state as stored by the owning component.
    pub status: String,
}
