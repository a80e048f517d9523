//! Application Service
//!
//! Business logic for application management, including turning status
//! report polling on and off.

use keel_core::domain::application::Application;
use keel_core::domain::poll::{PollConfig, PollTarget};
use keel_core::dto::application::UpsertApplication;
use sqlx::SqlitePool;

use crate::db;
use crate::repository::{application_repository, project_repository, schedule_repository};

/// Service error type
#[derive(Debug)]
pub enum ApplicationError {
    NotFound(String),
    ProjectNotFound(String),
    ValidationError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for ApplicationError {
    fn from(err: sqlx::Error) -> Self {
        ApplicationError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, ApplicationError>;

/// Create or update an application
///
/// Fields missing from the request keep their stored value. A new
/// application starts with polling disabled.
pub async fn upsert_application(
    pool: &SqlitePool,
    project: &str,
    req: UpsertApplication,
) -> Result<Application> {
    if req.name.trim().is_empty() {
        return Err(ApplicationError::ValidationError(
            "Application name cannot be empty".to_string(),
        ));
    }

    let now = chrono::Utc::now();
    let mut tx = db::begin_write(pool).await?;

    // Verify project exists
    let _project = project_repository::find_by_name(&mut *tx, project)
        .await?
        .ok_or_else(|| ApplicationError::ProjectNotFound(project.to_string()))?;

    let existing = application_repository::find(&mut *tx, project, &req.name).await?;
    let mut application = existing.unwrap_or_else(|| Application {
        project: project.to_string(),
        name: req.name.clone(),
        status_report_poll: PollConfig::default(),
        created_at: now,
        updated_at: now,
    });

    apply_poll_changes(&mut application.status_report_poll, &req);
    application.updated_at = now;

    let interval = application
        .status_report_poll
        .parsed_interval()
        .map_err(|e| ApplicationError::ValidationError(e.to_string()))?;

    application_repository::upsert(&mut *tx, &application).await?;
    schedule_repository::configure(
        &mut *tx,
        &PollTarget::application(project, &application.name),
        application.status_report_poll.enabled,
        interval,
        now,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Application upserted: {}/{} (poll enabled: {})",
        application.project,
        application.name,
        application.status_report_poll.enabled
    );

    Ok(application)
}

/// Get an application by project and name
pub async fn get_application(pool: &SqlitePool, project: &str, name: &str) -> Result<Application> {
    let application = application_repository::find(pool, project, name)
        .await?
        .ok_or_else(|| ApplicationError::NotFound(format!("{}/{}", project, name)))?;

    Ok(application)
}

/// List the applications of a project
pub async fn list_applications(pool: &SqlitePool, project: &str) -> Result<Vec<Application>> {
    // Verify project exists
    let _project = project_repository::find_by_name(pool, project)
        .await?
        .ok_or_else(|| ApplicationError::ProjectNotFound(project.to_string()))?;

    let applications = application_repository::find_by_project(pool, project).await?;
    Ok(applications)
}

fn apply_poll_changes(config: &mut PollConfig, req: &UpsertApplication) {
    if let Some(enabled) = req.poll {
        config.enabled = enabled;
    }

    if let Some(interval) = &req.poll_interval {
        config.interval = interval.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::project_service;
    use crate::test_support::test_pool;
    use keel_core::domain::poll::TargetKind;
    use keel_core::dto::project::{ApplicationConfig, UpsertProject};

    async fn seed_project(pool: &SqlitePool) {
        project_service::upsert_project(
            pool,
            UpsertProject {
                name: "Example".to_string(),
                data_source: Some(serde_json::json!({"local": {}})),
                data_source_poll: PollConfig::enabled("15ms"),
                applications: vec![ApplicationConfig {
                    name: "apple-app".to_string(),
                    status_report_poll: PollConfig {
                        enabled: false,
                        interval: "15ms".to_string(),
                    },
                }],
            },
        )
        .await
        .unwrap();
    }

    #[test]
    fn test_apply_poll_changes_keeps_missing_fields() {
        let mut config = PollConfig {
            enabled: false,
            interval: "30s".to_string(),
        };

        apply_poll_changes(
            &mut config,
            &UpsertApplication {
                name: "api".to_string(),
                poll: Some(true),
                poll_interval: None,
            },
        );

        assert!(config.enabled);
        assert_eq!(config.interval, "30s");
    }

    #[tokio::test]
    async fn test_enabling_poll_schedules_after_flip() {
        let pool = test_pool().await;
        seed_project(&pool).await;

        assert_eq!(
            schedule_repository::peek_soonest(&pool, TargetKind::Application)
                .await
                .unwrap(),
            None
        );

        let flipped_at = chrono::Utc::now();
        upsert_application(
            &pool,
            "Example",
            UpsertApplication {
                name: "apple-app".to_string(),
                poll: Some(true),
                poll_interval: None,
            },
        )
        .await
        .unwrap();

        let (target, at) = schedule_repository::peek_soonest(&pool, TargetKind::Application)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(target, PollTarget::application("Example", "apple-app"));
        assert!(at > flipped_at);
    }

    #[tokio::test]
    async fn test_enabling_without_interval_is_rejected() {
        let pool = test_pool().await;
        seed_project(&pool).await;

        let result = upsert_application(
            &pool,
            "Example",
            UpsertApplication {
                name: "new-app".to_string(),
                poll: Some(true),
                poll_interval: None,
            },
        )
        .await;

        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_new_application_defaults_to_disabled() {
        let pool = test_pool().await;
        seed_project(&pool).await;

        let app = upsert_application(
            &pool,
            "Example",
            UpsertApplication {
                name: "new-app".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(!app.status_report_poll.enabled);
        assert_eq!(list_applications(&pool, "Example").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_project() {
        let pool = test_pool().await;

        let result = upsert_application(
            &pool,
            "Missing",
            UpsertApplication {
                name: "api".to_string(),
                poll: Some(true),
                poll_interval: Some("1m".to_string()),
            },
        )
        .await;

        assert!(matches!(result, Err(ApplicationError::ProjectNotFound(_))));
    }
}
