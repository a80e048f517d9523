//! Shared helpers for tests

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tempfile::TempDir;

use crate::db;

/// In-memory database with migrations applied
///
/// A single connection keeps every query on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str(":memory:")
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to create test pool");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// File-backed database in a temporary directory, configured like production
///
/// Keep the returned directory alive for as long as the pool is used.
pub async fn file_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("keel.db").display());

    let pool = db::create_pool(&url)
        .await
        .expect("Failed to create file pool");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    (dir, pool)
}
