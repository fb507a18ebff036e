//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod group_membership_repository;
mod user_deleter;
mod user_directory;
mod user_repository;

#[cfg(test)]
pub use group_membership_repository::MockGroupMembershipRepository;
pub use group_membership_repository::{GroupMembershipError, GroupMembershipRepository};
#[cfg(test)]
pub use user_deleter::MockUserDeleter;
pub use user_deleter::{UserDeleter, UserDeletionError};
pub use user_directory::{
    CreateUserRequest, CreateUserResponse, DeleteUsersRequest, DeleteUsersResponse,
    ListUsersRequest, ModifyUserRequest, ModifyUserResponse, UserDirectory,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
