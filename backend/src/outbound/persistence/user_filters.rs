//! Translation of a [`UserQuery`] into boxed Diesel statements.
//!
//! [`filtered_users`] carries only the predicates so the same statement can
//! back both the page read and the count. Ordering and the page window are
//! layered on by [`ordered_page`].

use diesel::pg::Pg;
use diesel::prelude::*;
use pagination::SortDirection;

use crate::domain::{UserQuery, UserSort, UserSortColumn};

use super::schema::users;

pub(crate) type BoxedUsers<'a> = users::BoxedQuery<'a, Pg>;

/// Escape `LIKE` metacharacters so the search word matches literally.
pub(crate) fn like_pattern(word: &str) -> String {
    let mut escaped = String::with_capacity(word.len() + 2);
    escaped.push('%');
    for ch in word.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Apply every non-empty filter of `query`; empty lists add no predicate.
pub(crate) fn filtered_users(query: &UserQuery) -> BoxedUsers<'static> {
    let mut statement = users::table.into_boxed();

    if !query.user_ids().is_empty() {
        let ids: Vec<String> = query
            .user_ids()
            .iter()
            .map(|id| id.as_str().to_owned())
            .collect();
        statement = statement.filter(users::user_id.eq_any(ids));
    }
    if !query.usernames().is_empty() {
        statement = statement.filter(users::username.eq_any(query.usernames().to_vec()));
    }
    if !query.emails().is_empty() {
        statement = statement.filter(users::email.eq_any(query.emails().to_vec()));
    }
    if !query.phone_numbers().is_empty() {
        statement = statement.filter(users::phone_number.eq_any(query.phone_numbers().to_vec()));
    }
    if !query.statuses().is_empty() {
        statement = statement.filter(users::status.eq_any(query.statuses().to_vec()));
    }
    if let Some(word) = query.search_word() {
        let pattern = like_pattern(word);
        statement = statement.filter(
            users::username
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern.clone()))
                .or(users::phone_number.ilike(pattern)),
        );
    }

    statement
}

/// Order by the requested column, breaking ties on `user_id` in the same
/// direction, then apply the page window.
pub(crate) fn ordered_page(
    statement: BoxedUsers<'static>,
    query: &UserQuery,
) -> BoxedUsers<'static> {
    let UserSort { column, direction } = query.sort();
    let statement = match (column, direction) {
        (UserSortColumn::CreateTime, SortDirection::Ascending) => {
            statement.order_by(users::create_time.asc())
        }
        (UserSortColumn::CreateTime, SortDirection::Descending) => {
            statement.order_by(users::create_time.desc())
        }
        (UserSortColumn::UpdateTime, SortDirection::Ascending) => {
            statement.order_by(users::update_time.asc())
        }
        (UserSortColumn::UpdateTime, SortDirection::Descending) => {
            statement.order_by(users::update_time.desc())
        }
        (UserSortColumn::StatusTime, SortDirection::Ascending) => {
            statement.order_by(users::status_time.asc())
        }
        (UserSortColumn::StatusTime, SortDirection::Descending) => {
            statement.order_by(users::status_time.desc())
        }
        (UserSortColumn::Username, SortDirection::Ascending) => {
            statement.order_by(users::username.asc())
        }
        (UserSortColumn::Username, SortDirection::Descending) => {
            statement.order_by(users::username.desc())
        }
    };
    let statement = match direction {
        SortDirection::Ascending => statement.then_order_by(users::user_id.asc()),
        SortDirection::Descending => statement.then_order_by(users::user_id.desc()),
    };

    let window = query.window();
    statement.limit(window.limit()).offset(window.offset())
}
