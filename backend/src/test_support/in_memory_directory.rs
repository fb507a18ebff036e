//! In-memory implementation of the directory persistence ports.
//!
//! Mirrors the PostgreSQL adapters closely enough for behavioural tests:
//! filters, ordering with the `user_id` tie-breaker, page windows and the
//! all-or-nothing delete. Failures can be injected per port.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::SortDirection;

use crate::domain::ports::{
    GroupMembershipError, GroupMembershipRepository, UserDeleter, UserDeletionError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Group, GroupId, NewUser, User, UserChanges, UserId, UserQuery, UserSortColumn, UserStatus,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password: String,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    users: BTreeMap<UserId, StoredUser>,
    groups: BTreeMap<GroupId, Group>,
    bindings: BTreeSet<(UserId, GroupId)>,
    user_failure: Option<UserPersistenceError>,
    membership_failure: Option<GroupMembershipError>,
    deletion_failure: Option<UserDeletionError>,
}

/// Shared in-memory store implementing every persistence port.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryDirectoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a group so bindings can reference it.
    pub fn seed_group(&self, group: Group) {
        self.lock().groups.insert(group.group_id.clone(), group);
    }

    /// Add `user_id` to `group_id`.
    pub fn bind(&self, user_id: &UserId, group_id: &GroupId) {
        self.lock()
            .bindings
            .insert((user_id.clone(), group_id.clone()));
    }

    /// Groups `user_id` is currently bound to.
    pub fn bindings_for(&self, user_id: &UserId) -> Vec<GroupId> {
        self.lock()
            .bindings
            .iter()
            .filter(|(bound, _)| bound == user_id)
            .map(|(_, group)| group.clone())
            .collect()
    }

    /// Stored secret for `user_id`, if the user exists.
    pub fn stored_password(&self, user_id: &UserId) -> Option<String> {
        self.lock()
            .users
            .get(user_id)
            .map(|stored| stored.password.clone())
    }

    /// Fail every user repository call with `error` until cleared.
    pub fn fail_user_calls(&self, error: Option<UserPersistenceError>) {
        self.lock().user_failure = error;
    }

    /// Fail every membership call with `error` until cleared.
    pub fn fail_membership_calls(&self, error: Option<GroupMembershipError>) {
        self.lock().membership_failure = error;
    }

    /// Fail deletions with `error` after bindings were removed, so the
    /// rollback is observable.
    pub fn fail_deletions(&self, error: Option<UserDeletionError>) {
        self.lock().deletion_failure = error;
    }
}

fn check_user_failure(state: &StoreState) -> Result<(), UserPersistenceError> {
    state.user_failure.clone().map_or(Ok(()), Err)
}

fn check_membership_failure(state: &StoreState) -> Result<(), GroupMembershipError> {
    state.membership_failure.clone().map_or(Ok(()), Err)
}

fn contains_or_unfiltered<T: PartialEq>(filter: &[T], value: &T) -> bool {
    filter.is_empty() || filter.contains(value)
}

fn user_matches(query: &UserQuery, user: &User) -> bool {
    let search_hit = query.search_word().is_none_or(|word| {
        let word = word.to_lowercase();
        [&user.username, &user.email, &user.phone_number]
            .iter()
            .any(|field| field.to_lowercase().contains(&word))
    });

    contains_or_unfiltered(query.user_ids(), &user.user_id)
        && contains_or_unfiltered(query.usernames(), &user.username)
        && contains_or_unfiltered(query.emails(), &user.email)
        && contains_or_unfiltered(query.phone_numbers(), &user.phone_number)
        && (query.statuses().is_empty()
            || query
                .statuses()
                .iter()
                .any(|status| status == user.status.as_str()))
        && search_hit
}

fn compare(column: UserSortColumn, left: &User, right: &User) -> Ordering {
    let primary = match column {
        UserSortColumn::CreateTime => left.created_at.cmp(&right.created_at),
        UserSortColumn::UpdateTime => left.updated_at.cmp(&right.updated_at),
        UserSortColumn::StatusTime => left.status_changed_at.cmp(&right.status_changed_at),
        UserSortColumn::Username => left.username.cmp(&right.username),
    };
    primary.then_with(|| left.user_id.cmp(&right.user_id))
}

fn matching_users(state: &StoreState, query: &UserQuery) -> Vec<User> {
    state
        .users
        .values()
        .map(|stored| &stored.user)
        .filter(|user| user_matches(query, user))
        .cloned()
        .collect()
}

#[async_trait]
impl UserRepository for InMemoryDirectoryStore {
    async fn insert(&self, user: &NewUser) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        check_user_failure(&state)?;
        if state.users.contains_key(&user.user_id) {
            return Err(UserPersistenceError::query("duplicate record"));
        }

        let stored = StoredUser {
            user: User {
                user_id: user.user_id.clone(),
                username: user.username.clone(),
                email: user.email.clone(),
                phone_number: user.phone_number.clone(),
                description: user.description.clone(),
                extra: user.extra.clone(),
                status: UserStatus::Active,
                status_changed_at: user.created_at,
                created_at: user.created_at,
                updated_at: user.created_at,
            },
            password: user.password.expose().to_owned(),
        };
        state.users.insert(user.user_id.clone(), stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock();
        check_user_failure(&state)?;
        Ok(state.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        check_user_failure(&state)?;
        let stored = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserPersistenceError::not_found(id.as_str()))?;
        changes.apply_to(&mut stored.user);
        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock();
        check_user_failure(&state)?;

        let mut users = matching_users(&state, query);
        let sort = query.sort();
        users.sort_by(|left, right| {
            let ordering = compare(sort.column, left, right);
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });

        let window = query.window();
        let offset = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit()).unwrap_or(0);
        Ok(users.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, query: &UserQuery) -> Result<u64, UserPersistenceError> {
        let state = self.lock();
        check_user_failure(&state)?;
        let total = matching_users(&state, query).len();
        u64::try_from(total).map_err(|_| UserPersistenceError::query("count overflow"))
    }
}

#[async_trait]
impl GroupMembershipRepository for InMemoryDirectoryStore {
    async fn groups_for_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<Group>, GroupMembershipError> {
        let state = self.lock();
        check_membership_failure(&state)?;

        let group_ids: BTreeSet<&GroupId> = state
            .bindings
            .iter()
            .filter(|(user_id, _)| user_ids.contains(user_id))
            .map(|(_, group_id)| group_id)
            .collect();
        Ok(group_ids
            .into_iter()
            .filter_map(|group_id| state.groups.get(group_id).cloned())
            .collect())
    }

    async fn user_ids_for_groups(
        &self,
        group_ids: &[GroupId],
    ) -> Result<Vec<UserId>, GroupMembershipError> {
        let state = self.lock();
        check_membership_failure(&state)?;

        let members: BTreeSet<&UserId> = state
            .bindings
            .iter()
            .filter(|(_, group_id)| group_ids.contains(group_id))
            .map(|(user_id, _)| user_id)
            .collect();
        Ok(members.into_iter().cloned().collect())
    }
}

#[async_trait]
impl UserDeleter for InMemoryDirectoryStore {
    async fn delete_users(
        &self,
        user_ids: &[UserId],
        deleted_at: DateTime<Utc>,
    ) -> Result<(), UserDeletionError> {
        let mut state = self.lock();

        // Work on a copy; the live state is replaced only on success.
        let mut pending = state.clone();
        pending
            .bindings
            .retain(|(user_id, _)| !user_ids.contains(user_id));
        if let Some(error) = pending.deletion_failure.clone() {
            return Err(error);
        }
        for user_id in user_ids {
            if let Some(stored) = pending.users.get_mut(user_id) {
                stored.user.status = UserStatus::Deleted;
                stored.user.status_changed_at = deleted_at;
                stored.user.updated_at = deleted_at;
            }
        }

        *state = pending;
        Ok(())
    }
}
