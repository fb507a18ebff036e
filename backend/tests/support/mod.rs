//! Shared helpers for the backend integration suites.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module gives them one home for embedded PostgreSQL setup and error
//! rendering.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::provision_directory_database;

/// Render a `postgres` error with its SQLSTATE and message.
///
/// The `Display` output of `postgres::Error` often collapses to `db error`,
/// which hides what the server actually rejected.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
