use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

/// Begin a transaction that holds the write lock from its first statement
///
/// Read-then-write transactions must use this. A deferred transaction whose
/// snapshot is overtaken by another writer fails on its first write instead
/// of waiting for the lock.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create projects table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            name TEXT PRIMARY KEY,
            data_source TEXT,
            poll_enabled INTEGER NOT NULL DEFAULT 0,
            poll_interval TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create applications table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            project TEXT NOT NULL REFERENCES projects(name) ON DELETE CASCADE,
            name TEXT NOT NULL,
            poll_enabled INTEGER NOT NULL DEFAULT 0,
            poll_interval TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (project, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create poll schedules table
    //
    // One row per target. Project rows use an empty application name.
    // next_poll_at is unix milliseconds.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS poll_schedules (
            kind TEXT NOT NULL,
            project TEXT NOT NULL,
            application TEXT NOT NULL DEFAULT '',
            enabled INTEGER NOT NULL,
            interval_ms INTEGER NOT NULL,
            next_poll_at INTEGER,
            PRIMARY KEY (kind, project, application)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create jobs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id BLOB PRIMARY KEY,
            target_kind TEXT NOT NULL,
            project TEXT NOT NULL,
            application TEXT NOT NULL DEFAULT '',
            operation TEXT NOT NULL,
            triggered_by TEXT NOT NULL,
            state TEXT NOT NULL,
            created_at TEXT NOT NULL,
            started_at TEXT,
            completed_at TEXT,
            error_message TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_poll_schedules_due ON poll_schedules(kind, enabled, next_poll_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_jobs_target ON jobs(target_kind, project, application, triggered_by)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_state ON jobs(state)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at DESC)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
