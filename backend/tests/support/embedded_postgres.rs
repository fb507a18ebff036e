//! Embedded PostgreSQL databases carrying the directory schema.
//!
//! The schema in `tests/fixtures/schema` is applied once to a template
//! database named after the fixture's content hash; every test then gets a
//! fresh clone of that template.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

const DIRECTORY_SCHEMA: &str = include_str!("../fixtures/schema/directory.sql");
const TEMPLATE_NAME_PREFIX: &str = "directory_template";

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn schema_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("schema")
}

fn template_database_name() -> Result<String, String> {
    let hash = hash_directory(schema_dir()).map_err(|err| format!("hash schema: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Apply the directory schema to the database at `url`.
pub fn apply_schema(url: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(DIRECTORY_SCHEMA)
        .map_err(|err| format_postgres_error(&err))
}

fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        apply_schema(&url)?;
    }

    Ok(template_name)
}

/// Clone a fresh database from the directory schema template.
pub fn provision_directory_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let template_name = ensure_template_database(cluster)?;
    let db_name = format!("directory_test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|err| format!("create database from template: {err:?}"))
}
