//! Project Service
//!
//! Business logic for project management. Writes keep each project's poll
//! schedule, and those of the applications it carries, in step with their
//! configuration.

use keel_core::domain::application::Application;
use keel_core::domain::poll::{PollConfig, PollTarget};
use keel_core::domain::project::Project;
use keel_core::dto::project::UpsertProject;
use sqlx::SqlitePool;

use crate::db;
use crate::repository::{application_repository, project_repository, schedule_repository};

/// Service error type
#[derive(Debug)]
pub enum ProjectError {
    NotFound(String),
    ValidationError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for ProjectError {
    fn from(err: sqlx::Error) -> Self {
        ProjectError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, ProjectError>;

/// Create or update a project and the applications it lists
pub async fn upsert_project(pool: &SqlitePool, req: UpsertProject) -> Result<Project> {
    // Validate request
    validate_project_request(&req)?;

    let now = chrono::Utc::now();
    let mut tx = db::begin_write(pool).await?;

    let created_at = project_repository::find_by_name(&mut *tx, &req.name)
        .await?
        .map(|existing| existing.created_at)
        .unwrap_or(now);

    let project = Project {
        name: req.name.clone(),
        data_source: req.data_source.clone(),
        data_source_poll: req.data_source_poll.clone(),
        created_at,
        updated_at: now,
    };

    project_repository::upsert(&mut *tx, &project).await?;
    schedule_repository::configure(
        &mut *tx,
        &PollTarget::project(&project.name),
        project.data_source_poll.enabled,
        poll_interval(&project.data_source_poll)?,
        now,
    )
    .await?;

    for app in &req.applications {
        let created_at = application_repository::find(&mut *tx, &project.name, &app.name)
            .await?
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let application = Application {
            project: project.name.clone(),
            name: app.name.clone(),
            status_report_poll: app.status_report_poll.clone(),
            created_at,
            updated_at: now,
        };

        application_repository::upsert(&mut *tx, &application).await?;
        schedule_repository::configure(
            &mut *tx,
            &PollTarget::application(&project.name, &application.name),
            application.status_report_poll.enabled,
            poll_interval(&application.status_report_poll)?,
            now,
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Project upserted: {} (poll enabled: {}, applications: {})",
        project.name,
        project.data_source_poll.enabled,
        req.applications.len()
    );

    Ok(project)
}

/// Get a project by name
pub async fn get_project(pool: &SqlitePool, name: &str) -> Result<Project> {
    let project = project_repository::find_by_name(pool, name)
        .await?
        .ok_or_else(|| ProjectError::NotFound(name.to_string()))?;

    Ok(project)
}

/// List all projects
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<Project>> {
    let projects = project_repository::list_all(pool).await?;
    Ok(projects)
}

/// Delete a project, its applications and their poll schedules
pub async fn delete_project(pool: &SqlitePool, name: &str) -> Result<()> {
    let mut tx = db::begin_write(pool).await?;

    schedule_repository::delete_by_project(&mut *tx, name).await?;
    application_repository::delete_by_project(&mut *tx, name).await?;
    let deleted = project_repository::delete(&mut *tx, name).await?;

    if !deleted {
        return Err(ProjectError::NotFound(name.to_string()));
    }

    tx.commit().await?;

    tracing::info!("Project deleted: {}", name);

    Ok(())
}

// =============================================================================
// Validation
// =============================================================================

fn validate_project_request(req: &UpsertProject) -> Result<()> {
    validate_name("Project", &req.name)?;
    poll_interval(&req.data_source_poll)?;

    if req.data_source_poll.enabled && req.data_source.is_none() {
        return Err(ProjectError::ValidationError(
            "Project polling requires a data source".to_string(),
        ));
    }

    for app in &req.applications {
        validate_name("Application", &app.name)?;
        poll_interval(&app.status_report_poll)?;
    }

    Ok(())
}

fn validate_name(entity: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ProjectError::ValidationError(format!(
            "{} name cannot be empty",
            entity
        )));
    }

    if name.len() > 255 {
        return Err(ProjectError::ValidationError(format!(
            "{} name is too long (max 255 characters)",
            entity
        )));
    }

    Ok(())
}

fn poll_interval(config: &PollConfig) -> Result<std::time::Duration> {
    config
        .parsed_interval()
        .map_err(|e| ProjectError::ValidationError(e.to_string()))
}
