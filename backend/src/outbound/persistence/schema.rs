//! Diesel table definitions for the directory schema.
//!
//! These definitions must match the database migrations exactly. Migrations
//! are owned by the deployment tooling; `diesel print-schema` against a live
//! database regenerates this file.

diesel::table! {
    /// Directory user accounts.
    ///
    /// Rows are never physically removed; deletion flips `status`.
    users (user_id) {
        /// Primary key: `usr-` followed by 32 hex characters.
        user_id -> Varchar,
        /// Login name.
        username -> Varchar,
        /// Lower-cased, trimmed email address.
        email -> Varchar,
        /// Lower-cased, trimmed phone number.
        phone_number -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Stored secret; never selected by read paths.
        password -> Varchar,
        /// JSON object of string attributes, stored as text.
        extra -> Text,
        /// Lifecycle state: `active`, `disabled` or `deleted`.
        status -> Varchar,
        /// Instant of the last status change.
        status_time -> Timestamptz,
        /// Creation instant.
        create_time -> Timestamptz,
        /// Last modification instant.
        update_time -> Timestamptz,
    }
}

diesel::table! {
    /// Groups users can belong to. Read-only for this backend.
    groups (group_id) {
        /// Primary key.
        group_id -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Lifecycle state as stored.
        status -> Varchar,
    }
}

diesel::table! {
    /// Many-to-many membership between users and groups.
    user_group_bindings (user_id, group_id) {
        /// Member user.
        user_id -> Varchar,
        /// Containing group.
        group_id -> Varchar,
        /// Instant the binding was created.
        create_time -> Timestamptz,
    }
}

diesel::joinable!(user_group_bindings -> users (user_id));
diesel::joinable!(user_group_bindings -> groups (group_id));

diesel::allow_tables_to_appear_in_same_query!(users, groups, user_group_bindings);
