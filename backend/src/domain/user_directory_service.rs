//! User directory service implementing the `UserDirectory` driving port.
//!
//! The service owns no state beyond its injected ports: every call reads
//! from and writes to the store. Store failures are logged here, at the
//! point of detection, and returned with their kind intact; nothing is
//! retried.
//!
//! Known consistency limits:
//! - a delete racing a modify on the same id resolves last-write-wins;
//! - a page and its total are read by separate statements, so concurrent
//!   writes between them can skew the total slightly.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PaginationLimits};
use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::ports::{
    CreateUserRequest, CreateUserResponse, DeleteUsersRequest, DeleteUsersResponse,
    GroupMembershipError, GroupMembershipRepository, ListUsersRequest, ModifyUserRequest,
    ModifyUserResponse, UserDeleter, UserDeletionError, UserDirectory, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    Error, Group, NewUser, User, UserChanges, UserId, UserQueryBuilder, UserWithGroups,
    simplify_string, simplify_string_list,
};

/// Directory service backed by user, membership and deletion ports.
#[derive(Clone)]
pub struct UserDirectoryService<U, G, D> {
    users: Arc<U>,
    memberships: Arc<G>,
    deleter: Arc<D>,
    clock: Arc<dyn Clock>,
    limits: PaginationLimits,
}

impl<U, G, D> UserDirectoryService<U, G, D> {
    /// Create a service with default pagination limits.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use directory_backend::domain::UserDirectoryService;
    /// # use directory_backend::outbound::persistence::{
    /// #     DbPool, DieselGroupMembershipRepository, DieselUserDeleter, DieselUserRepository,
    /// #     PoolConfig,
    /// # };
    /// # use mockable::DefaultClock;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/directory")).await?;
    /// let service = UserDirectoryService::new(
    ///     Arc::new(DieselUserRepository::new(pool.clone())),
    ///     Arc::new(DieselGroupMembershipRepository::new(pool.clone())),
    ///     Arc::new(DieselUserDeleter::new(pool)),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        users: Arc<U>,
        memberships: Arc<G>,
        deleter: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            memberships,
            deleter,
            clock,
            limits: PaginationLimits::default(),
        }
    }

    /// Replace the pagination limits applied to list requests.
    pub fn with_limits(mut self, limits: PaginationLimits) -> Self {
        self.limits = limits;
        self
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::storage(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::storage(format!("user repository error: {message}"))
        }
        UserPersistenceError::NotFound { user_id } => user_not_found(&user_id),
    }
}

fn user_not_found(user_id: &str) -> Error {
    Error::not_found(format!("user {user_id} not found"))
        .with_details(json!({ "userId": user_id }))
}

fn map_membership_error(error: GroupMembershipError) -> Error {
    match error {
        GroupMembershipError::Connection { message } => {
            Error::storage(format!("group membership unavailable: {message}"))
        }
        GroupMembershipError::Query { message } => {
            Error::storage(format!("group membership error: {message}"))
        }
    }
}

fn map_deletion_error(error: UserDeletionError) -> Error {
    Error::storage(format!("delete users failed: {error}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn simplified_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| simplify_string(&value))
        .filter(|value| !value.is_empty())
}

impl<U, G, D> UserDirectoryService<U, G, D>
where
    U: UserRepository,
    G: GroupMembershipRepository,
    D: UserDeleter,
{
    async fn find_user(&self, user_id: &UserId) -> Result<User, Error> {
        let maybe_user = self.users.find_by_id(user_id).await.map_err(|err| {
            error!(%user_id, error = %err, "get user failed");
            map_user_error(err)
        })?;

        maybe_user.ok_or_else(|| {
            debug!(%user_id, "user not found");
            user_not_found(user_id.as_str())
        })
    }

    async fn groups_of(&self, user_id: &UserId) -> Result<Vec<Group>, Error> {
        self.memberships
            .groups_for_users(std::slice::from_ref(user_id))
            .await
            .map_err(|err| {
                error!(%user_id, error = %err, "get user groups failed");
                map_membership_error(err)
            })
    }

    fn build_changes(&self, request: ModifyUserRequest) -> UserChanges {
        UserChanges {
            username: non_empty(request.username),
            email: simplified_non_empty(request.email),
            phone_number: simplified_non_empty(request.phone_number),
            description: non_empty(request.description),
            extra: request.extra.filter(|extra| !extra.is_empty()),
            updated_at: self.clock.utc(),
        }
    }
}

#[async_trait]
impl<U, G, D> UserDirectory for UserDirectoryService<U, G, D>
where
    U: UserRepository,
    G: GroupMembershipRepository,
    D: UserDeleter,
{
    async fn create_user(&self, request: CreateUserRequest) -> Result<CreateUserResponse, Error> {
        let user = NewUser {
            user_id: UserId::generate(),
            username: request.username,
            email: simplify_string(&request.email),
            phone_number: simplify_string(&request.phone_number),
            description: request.description,
            password: request.password,
            extra: request.extra,
            created_at: self.clock.utc(),
        };

        self.users.insert(&user).await.map_err(|err| {
            error!(username = %user.username, error = %err, "insert user failed");
            map_user_error(err)
        })?;

        info!(user_id = %user.user_id, "user created");
        Ok(CreateUserResponse {
            user_id: user.user_id,
        })
    }

    async fn delete_users(
        &self,
        request: DeleteUsersRequest,
    ) -> Result<DeleteUsersResponse, Error> {
        let user_ids: Vec<UserId> = simplify_string_list(&request.user_ids)
            .into_iter()
            .filter_map(|id| UserId::new(id).ok())
            .collect();
        if user_ids.is_empty() {
            let err = Error::invalid_argument("empty user id")
                .with_details(json!({ "field": "userIds" }));
            error!(error = %err, "delete users rejected");
            return Err(err);
        }

        self.deleter
            .delete_users(&user_ids, self.clock.utc())
            .await
            .map_err(|err| {
                error!(user_ids = ?user_ids, error = %err, "delete users failed");
                map_deletion_error(err)
            })?;

        info!(count = user_ids.len(), "users deleted");
        Ok(DeleteUsersResponse { user_ids })
    }

    async fn modify_user(&self, request: ModifyUserRequest) -> Result<ModifyUserResponse, Error> {
        let user_id = request.user_id.clone();
        self.find_user(&user_id).await?;

        let changes = self.build_changes(request);
        self.users.update(&user_id, &changes).await.map_err(|err| {
            error!(%user_id, error = %err, "update user failed");
            map_user_error(err)
        })?;

        debug!(%user_id, "user modified");
        Ok(ModifyUserResponse { user_id })
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.find_user(user_id).await
    }

    async fn get_user_with_group(&self, user_id: &UserId) -> Result<UserWithGroups, Error> {
        let user = self.find_user(user_id).await?;
        let groups = self.groups_of(user_id).await?;
        Ok(UserWithGroups { user, groups })
    }

    async fn list_users(&self, request: ListUsersRequest) -> Result<Page<User>, Error> {
        let builder = UserQueryBuilder::new(&request, &self.limits);

        let query = if builder.group_ids().is_empty() {
            builder.build()
        } else {
            let members = self
                .memberships
                .user_ids_for_groups(builder.group_ids())
                .await
                .map_err(|err| {
                    error!(
                        group_ids = ?builder.group_ids(),
                        error = %err,
                        "get group users failed"
                    );
                    map_membership_error(err)
                })?;
            match builder.build_scoped(&members) {
                Some(query) => query,
                None => {
                    debug!("group scope left no users to list");
                    return Ok(Page::empty());
                }
            }
        };

        let users = self.users.list(&query).await.map_err(|err| {
            error!(query = ?query, error = %err, "list users failed");
            map_user_error(err)
        })?;
        let total = self.users.count(&query).await.map_err(|err| {
            error!(query = ?query, error = %err, "list users count failed");
            map_user_error(err)
        })?;

        Ok(Page::new(users, total))
    }

    async fn list_users_with_group(
        &self,
        request: ListUsersRequest,
    ) -> Result<Page<UserWithGroups>, Error> {
        let page = self.list_users(request).await?;

        // One resolution per user, in page order.
        let mut items = Vec::with_capacity(page.items.len());
        for user in page.items {
            let groups = self.groups_of(&user.user_id).await?;
            items.push(UserWithGroups { user, groups });
        }

        Ok(Page::new(items, page.total))
    }
}

#[cfg(test)]
#[path = "user_directory_service_tests.rs"]
mod tests;
