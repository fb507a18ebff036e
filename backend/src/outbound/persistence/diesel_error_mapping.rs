//! Diesel and pool failure mapping shared by the directory adapters.
//!
//! Each port has its own error enum with `connection` and `query`
//! constructors; these helpers take those constructors as closures so the
//! classification lives in one place.

use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through the port's connection constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Classify a Diesel failure as a connection or a query error.
///
/// Details are logged at debug level; the returned message stays stable so
/// callers never see raw SQL.
pub(crate) fn map_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("duplicate record")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

#[cfg(test)]
mod tests {
    //! Classification coverage using the user repository error type.
    use super::*;
    use crate::domain::ports::UserPersistenceError;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct StubInfo;

    impl DatabaseErrorInformation for StubInfo {
        fn message(&self) -> &str {
            "stub failure"
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            Some("users")
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            None
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn classify(error: DieselError) -> UserPersistenceError {
        map_diesel_error(
            error,
            UserPersistenceError::query,
            UserPersistenceError::connection,
        )
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err: UserPersistenceError = map_pool_error(
            PoolError::checkout("connection refused"),
            UserPersistenceError::connection,
        );

        assert!(matches!(err, UserPersistenceError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    #[case(DieselError::NotFound, "record not found")]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(StubInfo)),
        "duplicate record"
    )]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, Box::new(StubInfo)),
        "database error"
    )]
    fn query_failures_keep_stable_messages(#[case] error: DieselError, #[case] expected: &str) {
        let err = classify(error);

        assert!(matches!(err, UserPersistenceError::Query { .. }));
        assert!(err.to_string().contains(expected));
        assert!(!err.to_string().contains("stub failure"));
    }

    #[rstest]
    fn closed_connections_become_connection_errors() {
        let err = classify(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new(StubInfo),
        ));

        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }
}
