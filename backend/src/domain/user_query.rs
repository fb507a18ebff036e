//! Filter and pagination builder for user listings.
//!
//! A list request is normalised once into a [`UserQueryBuilder`], optionally
//! narrowed to the members of requested groups, and finally frozen into an
//! immutable [`UserQuery`]. Persistence adapters receive the same
//! [`UserQuery`] for the page read and for the count, so both see identical
//! predicates. Only the page read applies the [`PageWindow`].

use std::collections::HashSet;

use pagination::{PageWindow, PaginationLimits, SortDirection};
use serde::{Deserialize, Serialize};

use super::group::GroupId;
use super::identifiers::{simplify_contact_list, simplify_string_list};
use super::ports::ListUsersRequest;
use super::user::UserId;

/// Column a user listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSortColumn {
    /// Creation instant.
    #[default]
    CreateTime,
    /// Last modification instant.
    UpdateTime,
    /// Last status change instant.
    StatusTime,
    /// Login name.
    Username,
}

impl UserSortColumn {
    /// Resolve a sort key as spelled by callers, e.g. `create_time`.
    ///
    /// # Examples
    /// ```
    /// use directory_backend::domain::UserSortColumn;
    ///
    /// assert_eq!(UserSortColumn::from_key("username"), Some(UserSortColumn::Username));
    /// assert_eq!(UserSortColumn::from_key("password"), None);
    /// ```
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "create_time" => Some(Self::CreateTime),
            "update_time" => Some(Self::UpdateTime),
            "status_time" => Some(Self::StatusTime),
            "username" => Some(Self::Username),
            _ => None,
        }
    }
}

/// Sort column plus direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserSort {
    /// Column to order by.
    pub column: UserSortColumn,
    /// Direction applied to the column.
    pub direction: SortDirection,
}

/// Normalised list request awaiting optional group scoping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQueryBuilder {
    group_ids: Vec<GroupId>,
    user_ids: Vec<UserId>,
    usernames: Vec<String>,
    emails: Vec<String>,
    phone_numbers: Vec<String>,
    statuses: Vec<String>,
    search_word: Option<String>,
    sort: UserSort,
    window: PageWindow,
}

impl UserQueryBuilder {
    /// Normalise every filter field and clamp pagination.
    pub fn new(request: &ListUsersRequest, limits: &PaginationLimits) -> Self {
        let search_word = request
            .search_word
            .as_deref()
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .map(str::to_owned);

        Self {
            group_ids: simplify_string_list(&request.group_ids)
                .into_iter()
                .map(GroupId::new)
                .collect(),
            user_ids: normalise_user_ids(&request.user_ids),
            usernames: simplify_string_list(&request.usernames),
            emails: simplify_contact_list(&request.emails),
            phone_numbers: simplify_contact_list(&request.phone_numbers),
            statuses: simplify_string_list(&request.statuses),
            search_word,
            sort: UserSort {
                column: request.sort_key.unwrap_or_default(),
                direction: request.sort_direction.unwrap_or_default(),
            },
            window: limits.window(request.limit, request.offset),
        }
    }

    /// Groups the listing is scoped to; empty when unscoped.
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Freeze the descriptor, ignoring any group scope.
    pub fn build(self) -> UserQuery {
        UserQuery {
            user_ids: self.user_ids,
            usernames: self.usernames,
            emails: self.emails,
            phone_numbers: self.phone_numbers,
            statuses: self.statuses,
            search_word: self.search_word,
            sort: self.sort,
            window: self.window,
        }
    }

    /// Freeze the descriptor restricted to `members` of the requested groups.
    ///
    /// Without an explicit user-id filter the members become the filter.
    /// With one, only ids present in both survive, in the caller's order.
    /// Returns `None` when no id survives: the listing is empty and the
    /// store must not be queried, since an empty `IN` set would otherwise
    /// read as "no filter".
    pub fn build_scoped(mut self, members: &[UserId]) -> Option<UserQuery> {
        self.user_ids = if self.user_ids.is_empty() {
            let mut seen = HashSet::new();
            members
                .iter()
                .filter(|id| seen.insert(*id))
                .cloned()
                .collect()
        } else {
            let members: HashSet<&UserId> = members.iter().collect();
            self.user_ids
                .into_iter()
                .filter(|id| members.contains(id))
                .collect()
        };

        if self.user_ids.is_empty() {
            return None;
        }
        Some(self.build())
    }
}

fn normalise_user_ids(raw: &[String]) -> Vec<UserId> {
    simplify_string_list(raw)
        .into_iter()
        .filter_map(|id| UserId::new(id).ok())
        .collect()
}

/// Immutable, bounded description of a user listing.
///
/// Empty filter lists add no predicate. The [`PageWindow`] only applies to
/// page reads; counts ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    user_ids: Vec<UserId>,
    usernames: Vec<String>,
    emails: Vec<String>,
    phone_numbers: Vec<String>,
    statuses: Vec<String>,
    search_word: Option<String>,
    sort: UserSort,
    window: PageWindow,
}

impl UserQuery {
    /// `user_id IN (...)` values.
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    /// `username IN (...)` values.
    pub fn usernames(&self) -> &[String] {
        &self.usernames
    }

    /// `email IN (...)` values, simplified.
    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    /// `phone_number IN (...)` values, simplified.
    pub fn phone_numbers(&self) -> &[String] {
        &self.phone_numbers
    }

    /// `status IN (...)` values as supplied.
    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    /// Trimmed, case-insensitive substring searched in username, email
    /// and phone number.
    pub fn search_word(&self) -> Option<&str> {
        self.search_word.as_deref()
    }

    /// Requested ordering.
    pub fn sort(&self) -> UserSort {
        self.sort
    }

    /// Clamped page bounds.
    pub fn window(&self) -> PageWindow {
        self.window
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for normalisation, clamping and group scoping.
    use super::*;
    use rstest::{fixture, rstest};

    fn ids(raw: &[&str]) -> Vec<UserId> {
        raw.iter()
            .map(|id| UserId::new(id).expect("valid user id"))
            .collect()
    }

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| (*value).to_owned()).collect()
    }

    #[fixture]
    fn limits() -> PaginationLimits {
        PaginationLimits::default()
    }

    #[rstest]
    fn builder_normalises_every_field(limits: PaginationLimits) {
        let request = ListUsersRequest {
            group_ids: strings(&[" grp-1 ", "grp-1", ""]),
            user_ids: strings(&["usr-a", " usr-a", "  "]),
            usernames: strings(&["alice", "alice"]),
            emails: strings(&["ALICE@X.com "]),
            phone_numbers: strings(&[" 555 "]),
            statuses: strings(&["active", "", "active"]),
            search_word: Some("  ali ".to_owned()),
            ..ListUsersRequest::default()
        };

        let builder = UserQueryBuilder::new(&request, &limits);
        assert_eq!(builder.group_ids(), &[GroupId::new("grp-1")]);

        let query = builder.build();
        assert_eq!(query.user_ids(), ids(&["usr-a"]).as_slice());
        assert_eq!(query.usernames(), &["alice".to_owned()]);
        assert_eq!(query.emails(), &["alice@x.com".to_owned()]);
        assert_eq!(query.phone_numbers(), &["555".to_owned()]);
        assert_eq!(query.statuses(), &["active".to_owned()]);
        assert_eq!(query.search_word(), Some("ali"));
    }

    #[rstest]
    fn empty_request_yields_unfiltered_newest_first_query(limits: PaginationLimits) {
        let query = UserQueryBuilder::new(&ListUsersRequest::default(), &limits).build();

        assert!(query.user_ids().is_empty());
        assert!(query.statuses().is_empty());
        assert_eq!(query.search_word(), None);
        assert_eq!(query.sort().column, UserSortColumn::CreateTime);
        assert_eq!(query.sort().direction, SortDirection::Descending);
        assert_eq!(query.window().limit(), 20);
        assert_eq!(query.window().offset(), 0);
    }

    #[rstest]
    fn blank_search_word_is_ignored(limits: PaginationLimits) {
        let request = ListUsersRequest {
            search_word: Some("   ".to_owned()),
            ..ListUsersRequest::default()
        };
        let query = UserQueryBuilder::new(&request, &limits).build();
        assert_eq!(query.search_word(), None);
    }

    #[rstest]
    fn explicit_sort_and_window_are_honoured(limits: PaginationLimits) {
        let request = ListUsersRequest {
            sort_key: Some(UserSortColumn::Username),
            sort_direction: Some(SortDirection::Ascending),
            limit: Some(1_000),
            offset: Some(-4),
            ..ListUsersRequest::default()
        };
        let query = UserQueryBuilder::new(&request, &limits).build();

        assert_eq!(query.sort().column, UserSortColumn::Username);
        assert_eq!(query.sort().direction, SortDirection::Ascending);
        assert_eq!(query.window().limit(), 200);
        assert_eq!(query.window().offset(), 0);
    }

    #[rstest]
    fn scoped_query_intersects_explicit_ids(limits: PaginationLimits) {
        let request = ListUsersRequest {
            group_ids: strings(&["grp-g"]),
            user_ids: strings(&["usr-c", "usr-a", "usr-b"]),
            ..ListUsersRequest::default()
        };
        let query = UserQueryBuilder::new(&request, &limits)
            .build_scoped(&ids(&["usr-a", "usr-b", "usr-z"]))
            .expect("intersection is not empty");

        assert_eq!(query.user_ids(), ids(&["usr-a", "usr-b"]).as_slice());
    }

    #[rstest]
    fn scoped_query_adopts_members_without_explicit_ids(limits: PaginationLimits) {
        let request = ListUsersRequest {
            group_ids: strings(&["grp-g"]),
            ..ListUsersRequest::default()
        };
        let query = UserQueryBuilder::new(&request, &limits)
            .build_scoped(&ids(&["usr-b", "usr-a", "usr-b"]))
            .expect("members present");

        assert_eq!(query.user_ids(), ids(&["usr-b", "usr-a"]).as_slice());
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&["usr-a"], &[])]
    #[case(&["usr-a"], &["usr-b"])]
    fn scoped_query_short_circuits_on_empty_result(
        limits: PaginationLimits,
        #[case] explicit: &[&str],
        #[case] members: &[&str],
    ) {
        let request = ListUsersRequest {
            group_ids: strings(&["grp-g"]),
            user_ids: strings(explicit),
            ..ListUsersRequest::default()
        };
        let scoped = UserQueryBuilder::new(&request, &limits).build_scoped(&ids(members));
        assert!(scoped.is_none());
    }

    #[rstest]
    #[case("create_time", Some(UserSortColumn::CreateTime))]
    #[case(" update_time ", Some(UserSortColumn::UpdateTime))]
    #[case("status_time", Some(UserSortColumn::StatusTime))]
    #[case("email", None)]
    fn sort_keys_resolve(#[case] key: &str, #[case] expected: Option<UserSortColumn>) {
        assert_eq!(UserSortColumn::from_key(key), expected);
    }
}
