//! Project Repository
//!
//! Handles all database operations related to projects.

use keel_core::domain::poll::PollConfig;
use keel_core::domain::project::Project;
use sqlx::{Executor, Sqlite};

/// Insert or update a project
pub async fn upsert<'e, E>(executor: E, project: &Project) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO projects (name, data_source, poll_enabled, poll_interval, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (name) DO UPDATE
        SET data_source = excluded.data_source,
            poll_enabled = excluded.poll_enabled,
            poll_interval = excluded.poll_interval,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&project.name)
    .bind(project.data_source.as_ref().map(|v| v.to_string()))
    .bind(project.data_source_poll.enabled)
    .bind(&project.data_source_poll.interval)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Find a project by name
pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Project>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT name, data_source, poll_enabled, poll_interval, created_at, updated_at
        FROM projects
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all projects
pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Project>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT name, data_source, poll_enabled, poll_interval, created_at, updated_at
        FROM projects
        ORDER BY name ASC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete a project by name
pub async fn delete<'e, E>(executor: E, name: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM projects WHERE name = ?")
        .bind(name)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProjectRow {
    name: String,
    data_source: Option<String>,
    poll_enabled: bool,
    poll_interval: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        let data_source = row
            .data_source
            .and_then(|raw| serde_json::from_str(&raw).ok());

        Project {
            name: row.name,
            data_source,
            data_source_poll: PollConfig {
                enabled: row.poll_enabled,
                interval: row.poll_interval,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
