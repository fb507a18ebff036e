//! Domain primitives, ports and the directory service.
//!
//! Purpose: define the user and group model, normalise list requests into
//! bounded query descriptors, and orchestrate repository ports without
//! depending on any persistence technology.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic failure taxonomy.
//! - User, UserId, UserStatus, NewUser, UserChanges, UserWithGroups.
//! - Group, GroupId — read-only group references.
//! - UserQuery, UserQueryBuilder — list query descriptor and its builder.
//! - UserDirectoryService — implementation of the `UserDirectory` port.

pub mod error;
pub mod group;
pub mod identifiers;
pub mod ports;
pub mod user;
pub mod user_directory_service;
pub mod user_query;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::group::{Group, GroupId};
pub use self::identifiers::{simplify_contact_list, simplify_string, simplify_string_list};
pub use self::user::{
    ExtraAttributes, NewUser, Password, USER_ID_PREFIX, User, UserChanges, UserId, UserStatus,
    UserValidationError, UserWithGroups,
};
pub use self::user_directory_service::UserDirectoryService;
pub use self::user_query::{UserQuery, UserQueryBuilder, UserSort, UserSortColumn};
