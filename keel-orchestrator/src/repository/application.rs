//! Application Repository
//!
//! Handles all database operations related to applications.

use keel_core::domain::application::Application;
use keel_core::domain::poll::PollConfig;
use sqlx::{Executor, Sqlite};

/// Insert or update an application
pub async fn upsert<'e, E>(executor: E, application: &Application) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO applications (project, name, poll_enabled, poll_interval, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (project, name) DO UPDATE
        SET poll_enabled = excluded.poll_enabled,
            poll_interval = excluded.poll_interval,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&application.project)
    .bind(&application.name)
    .bind(application.status_report_poll.enabled)
    .bind(&application.status_report_poll.interval)
    .bind(application.created_at)
    .bind(application.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Find an application by project and name
pub async fn find<'e, E>(
    executor: E,
    project: &str,
    name: &str,
) -> Result<Option<Application>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT project, name, poll_enabled, poll_interval, created_at, updated_at
        FROM applications
        WHERE project = ? AND name = ?
        "#,
    )
    .bind(project)
    .bind(name)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List the applications of a project
pub async fn find_by_project<'e, E>(
    executor: E,
    project: &str,
) -> Result<Vec<Application>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT project, name, poll_enabled, poll_interval, created_at, updated_at
        FROM applications
        WHERE project = ?
        ORDER BY name ASC
        "#,
    )
    .bind(project)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete all applications of a project
pub async fn delete_by_project<'e, E>(executor: E, project: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM applications WHERE project = ?")
        .bind(project)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    project: String,
    name: String,
    poll_enabled: bool,
    poll_interval: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Application {
            project: row.project,
            name: row.name,
            status_report_poll: PollConfig {
                enabled: row.poll_enabled,
                interval: row.poll_interval,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
