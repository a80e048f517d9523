//! Job Repository
//!
//! Handles all database operations related to jobs.

use keel_core::domain::job::{Job, JobOperation, JobSpec, JobState, JobTrigger};
use keel_core::domain::poll::{PollTarget, TargetKind};
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

/// Create a new queued job in the database
pub async fn create<'e, E>(executor: E, spec: JobSpec) -> Result<Job, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO jobs (id, target_kind, project, application, operation, triggered_by, state, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(spec.target.kind().as_str())
    .bind(spec.target.project_name())
    .bind(spec.target.application_name().unwrap_or(""))
    .bind(operation_to_string(spec.operation))
    .bind(trigger_to_string(spec.trigger))
    .bind(state_to_string(JobState::Queued))
    .bind(now)
    .execute(executor)
    .await?;

    Ok(Job {
        id,
        target: spec.target,
        operation: spec.operation,
        trigger: spec.trigger,
        state: JobState::Queued,
        created_at: now,
        started_at: None,
        completed_at: None,
        error_message: None,
    })
}

/// Find a job by ID
pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Job>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT id, target_kind, project, application, operation, triggered_by,
               state, created_at, started_at, completed_at, error_message
        FROM jobs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all jobs
pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Job>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT id, target_kind, project, application, operation, triggered_by,
               state, created_at, started_at, completed_at, error_message
        FROM jobs
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// List poll-triggered jobs of a target, newest first
pub async fn list_poll_jobs<'e, E>(executor: E, target: &PollTarget) -> Result<Vec<Job>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT id, target_kind, project, application, operation, triggered_by,
               state, created_at, started_at, completed_at, error_message
        FROM jobs
        WHERE target_kind = ? AND project = ? AND application = ? AND triggered_by = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(target.kind().as_str())
    .bind(target.project_name())
    .bind(target.application_name().unwrap_or(""))
    .bind(trigger_to_string(JobTrigger::Poll))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Move a queued job to running
///
/// Returns false when the job is missing or has already left the queue.
pub async fn update_state_to_running<'e, E>(executor: E, job_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET state = ?, started_at = ?
        WHERE id = ? AND state NOT IN (?, ?, ?)
        "#,
    )
    .bind(state_to_string(JobState::Running))
    .bind(now)
    .bind(job_id)
    .bind(state_to_string(JobState::Running))
    .bind(state_to_string(JobState::Complete))
    .bind(state_to_string(JobState::Error))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Move an unfinished job to a terminal state
///
/// Returns false when the job is missing or already finished.
pub async fn update_state_to_completed<'e, E>(
    executor: E,
    job_id: Uuid,
    state: JobState,
    error_message: Option<&str>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET state = ?, completed_at = ?, error_message = ?
        WHERE id = ? AND state NOT IN (?, ?)
        "#,
    )
    .bind(state_to_string(state))
    .bind(now)
    .bind(error_message)
    .bind(job_id)
    .bind(state_to_string(JobState::Complete))
    .bind(state_to_string(JobState::Error))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Helper Functions
// =============================================================================

fn state_to_string(state: JobState) -> &'static str {
    match state {
        JobState::Queued => "Queued",
        JobState::Running => "Running",
        JobState::Complete => "Complete",
        JobState::Error => "Error",
    }
}

/// Unknown states read back as `Queued`, so they keep blocking new polls
fn string_to_state(s: &str) -> JobState {
    match s {
        "Queued" => JobState::Queued,
        "Running" => JobState::Running,
        "Complete" => JobState::Complete,
        "Error" => JobState::Error,
        _ => JobState::Queued,
    }
}

fn operation_to_string(operation: JobOperation) -> &'static str {
    match operation {
        JobOperation::Poll => "poll",
        JobOperation::StatusReport => "status_report",
    }
}

fn string_to_operation(s: &str) -> JobOperation {
    match s {
        "status_report" => JobOperation::StatusReport,
        _ => JobOperation::Poll,
    }
}

fn trigger_to_string(trigger: JobTrigger) -> &'static str {
    match trigger {
        JobTrigger::Poll => "poll",
        JobTrigger::Manual => "manual",
    }
}

fn string_to_trigger(s: &str) -> JobTrigger {
    match s {
        "poll" => JobTrigger::Poll,
        _ => JobTrigger::Manual,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    target_kind: String,
    project: String,
    application: String,
    operation: String,
    triggered_by: String,
    state: String,
    created_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    error_message: Option<String>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        let target = match row.target_kind.parse::<TargetKind>() {
            Ok(TargetKind::Application) => PollTarget::application(row.project, row.application),
            _ => PollTarget::project(row.project),
        };

        Job {
            id: row.id,
            target,
            operation: string_to_operation(&row.operation),
            trigger: string_to_trigger(&row.triggered_by),
            state: string_to_state(&row.state),
            created_at: row.created_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            error_message: row.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let target = PollTarget::application("web", "api");

        let job = create(&pool, JobSpec::poll(target.clone())).await.unwrap();
        assert_eq!(job.state, JobState::Queued);

        let found = find_by_id(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(found.target, target);
        assert_eq!(found.operation, JobOperation::StatusReport);
        assert_eq!(found.trigger, JobTrigger::Poll);
        assert_eq!(found.state, JobState::Queued);
    }

    #[tokio::test]
    async fn test_list_poll_jobs_scoped_to_target_and_trigger() {
        let pool = test_pool().await;
        let project = PollTarget::project("web");
        let app = PollTarget::application("web", "api");

        create(&pool, JobSpec::poll(project.clone())).await.unwrap();
        create(&pool, JobSpec::poll(app.clone())).await.unwrap();
        create(
            &pool,
            JobSpec {
                target: project.clone(),
                operation: JobOperation::Poll,
                trigger: JobTrigger::Manual,
            },
        )
        .await
        .unwrap();

        let jobs = list_poll_jobs(&pool, &project).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].target, project);

        let jobs = list_poll_jobs(&pool, &app).await.unwrap();
        assert_eq!(jobs.len(), 1);

        assert_eq!(list_all(&pool).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_state_transitions_persist() {
        let pool = test_pool().await;
        let job = create(&pool, JobSpec::poll(PollTarget::project("web")))
            .await
            .unwrap();

        assert!(update_state_to_running(&pool, job.id).await.unwrap());
        let running = find_by_id(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(running.state, JobState::Running);
        assert!(running.started_at.is_some());

        assert!(
            update_state_to_completed(&pool, job.id, JobState::Error, Some("boom"))
                .await
                .unwrap()
        );
        let failed = find_by_id(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(failed.state, JobState::Error);
        assert_eq!(failed.error_message.as_deref(), Some("boom"));
        assert!(failed.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_transitions_apply_once() {
        let pool = test_pool().await;
        let job = create(&pool, JobSpec::poll(PollTarget::project("web")))
            .await
            .unwrap();

        assert!(update_state_to_running(&pool, job.id).await.unwrap());
        assert!(!update_state_to_running(&pool, job.id).await.unwrap());

        assert!(
            update_state_to_completed(&pool, job.id, JobState::Complete, None)
                .await
                .unwrap()
        );
        assert!(
            !update_state_to_completed(&pool, job.id, JobState::Error, Some("late"))
                .await
                .unwrap()
        );
        assert!(!update_state_to_running(&pool, job.id).await.unwrap());

        let done = find_by_id(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(done.state, JobState::Complete);
        assert!(done.error_message.is_none());
    }

    #[tokio::test]
    async fn test_queued_job_can_finish_directly() {
        let pool = test_pool().await;
        let job = create(&pool, JobSpec::poll(PollTarget::project("web")))
            .await
            .unwrap();

        assert!(
            update_state_to_completed(&pool, job.id, JobState::Error, Some("boom"))
                .await
                .unwrap()
        );
        assert!(!update_state_to_running(&pool, job.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_state_reads_as_queued() {
        let pool = test_pool().await;
        let job = create(&pool, JobSpec::poll(PollTarget::project("web")))
            .await
            .unwrap();

        sqlx::query("UPDATE jobs SET state = 'Paused' WHERE id = ?")
            .bind(job.id)
            .execute(&pool)
            .await
            .unwrap();

        let found = find_by_id(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(found.state, JobState::Queued);
    }
}
