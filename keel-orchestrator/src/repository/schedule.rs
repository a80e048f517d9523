//! Poll Schedule Repository
//!
//! Persisted next-due times for every poll target.
//!
//! Read and single-statement write functions are generic over the sqlx
//! executor, so callers can run them directly on the pool or inside a
//! transaction they already hold.

use chrono::{DateTime, Utc};
use keel_core::domain::poll::{PollSchedule, PollTarget, TargetKind};
use sqlx::{Executor, Sqlite, SqliteConnection};
use std::time::Duration;

/// Soonest due enabled target of a kind
///
/// Returns `None` when no enabled target of that kind has a next poll time.
pub async fn peek_soonest<'e, E>(
    executor: E,
    kind: TargetKind,
) -> Result<Option<(PollTarget, DateTime<Utc>)>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT kind, project, application, enabled, interval_ms, next_poll_at
        FROM poll_schedules
        WHERE kind = ? AND enabled = 1 AND next_poll_at IS NOT NULL
        ORDER BY next_poll_at ASC, project ASC, application ASC
        LIMIT 1
        "#,
    )
    .bind(kind.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(row
        .and_then(ScheduleRow::into_schedule)
        .and_then(|s| s.next_poll_at.map(|at| (s.target, at))))
}

/// Find the schedule of a single target
pub async fn find<'e, E>(executor: E, target: &PollTarget) -> Result<Option<PollSchedule>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT kind, project, application, enabled, interval_ms, next_poll_at
        FROM poll_schedules
        WHERE kind = ? AND project = ? AND application = ?
        "#,
    )
    .bind(target.kind().as_str())
    .bind(target.project_name())
    .bind(target.application_name().unwrap_or(""))
    .fetch_optional(executor)
    .await?;

    Ok(row.and_then(ScheduleRow::into_schedule))
}

/// Move a target's next poll time to `now + interval`
///
/// The interval is read in the same statement, so a concurrent interval
/// change is never overwritten with a stale value. Returns false when the
/// target has no schedule.
pub async fn advance<'e, E>(
    executor: E,
    target: &PollTarget,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE poll_schedules
        SET next_poll_at = ? + interval_ms
        WHERE kind = ? AND project = ? AND application = ?
        "#,
    )
    .bind(now.timestamp_millis())
    .bind(target.kind().as_str())
    .bind(target.project_name())
    .bind(target.application_name().unwrap_or(""))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Write a target's poll configuration
///
/// Creates the schedule on first write. The next poll time follows
/// [`next_poll_after_configure`].
pub async fn configure(
    conn: &mut SqliteConnection,
    target: &PollTarget,
    enabled: bool,
    interval: Duration,
    now: DateTime<Utc>,
) -> Result<PollSchedule, sqlx::Error> {
    let existing = find(&mut *conn, target).await?;
    let next_poll_at = next_poll_after_configure(existing.as_ref(), enabled, interval, now);

    sqlx::query(
        r#"
        INSERT INTO poll_schedules (kind, project, application, enabled, interval_ms, next_poll_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (kind, project, application) DO UPDATE
        SET enabled = excluded.enabled,
            interval_ms = excluded.interval_ms,
            next_poll_at = excluded.next_poll_at
        "#,
    )
    .bind(target.kind().as_str())
    .bind(target.project_name())
    .bind(target.application_name().unwrap_or(""))
    .bind(enabled)
    .bind(duration_to_millis(interval))
    .bind(next_poll_at.map(|at| at.timestamp_millis()))
    .execute(&mut *conn)
    .await?;

    Ok(PollSchedule {
        target: target.clone(),
        enabled,
        interval,
        next_poll_at,
    })
}

/// Delete the schedules of a project and all of its applications
pub async fn delete_by_project<'e, E>(executor: E, project: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM poll_schedules WHERE project = ?")
        .bind(project)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Next poll time after a configuration write
///
/// - first enable, or re-enable after being disabled: `now + interval`
/// - interval changed while enabled: rescheduled to `now + interval`
/// - unchanged while enabled: kept
/// - disabled: the stored time is kept but ignored by peeks
pub fn next_poll_after_configure(
    existing: Option<&PollSchedule>,
    enabled: bool,
    interval: Duration,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let rescheduled = now
        .checked_add_signed(chrono::Duration::milliseconds(duration_to_millis(interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    match existing {
        None if enabled => Some(rescheduled),
        None => None,
        Some(schedule) if !enabled => schedule.next_poll_at,
        Some(schedule) if !schedule.enabled || schedule.next_poll_at.is_none() => Some(rescheduled),
        Some(schedule) if schedule.interval != interval => Some(rescheduled),
        Some(schedule) => schedule.next_poll_at,
    }
}

// ~100 years
const MAX_INTERVAL_MS: i64 = 100 * 365 * 24 * 60 * 60 * 1000;

// =============================================================================
// Helper Functions
// =============================================================================

fn duration_to_millis(duration: Duration) -> i64 {
    // At least 1ms so an advance always moves forward, at most
    // MAX_INTERVAL_MS so `now + interval_ms` stays in range
    i64::try_from(duration.as_millis())
        .unwrap_or(i64::MAX)
        .clamp(1, MAX_INTERVAL_MS)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ScheduleRow {
    kind: String,
    project: String,
    application: String,
    enabled: bool,
    interval_ms: i64,
    next_poll_at: Option<i64>,
}

impl ScheduleRow {
    fn into_schedule(self) -> Option<PollSchedule> {
        let target = match self.kind.parse::<TargetKind>() {
            Ok(TargetKind::Project) => PollTarget::project(self.project),
            Ok(TargetKind::Application) => PollTarget::application(self.project, self.application),
            Err(e) => {
                tracing::warn!("Ignoring poll schedule row: {}", e);
                return None;
            }
        };

        Some(PollSchedule {
            target,
            enabled: self.enabled,
            interval: Duration::from_millis(self.interval_ms.max(0) as u64),
            next_poll_at: self.next_poll_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    async fn configure_on_pool(
        pool: &sqlx::SqlitePool,
        target: &PollTarget,
        enabled: bool,
        interval: Duration,
        now: DateTime<Utc>,
    ) -> PollSchedule {
        let mut conn = pool.acquire().await.unwrap();
        configure(&mut *conn, target, enabled, interval, now)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_peek_empty_store_is_none() {
        let pool = test_pool().await;

        assert_eq!(peek_soonest(&pool, TargetKind::Project).await.unwrap(), None);
        assert_eq!(
            peek_soonest(&pool, TargetKind::Application).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_peek_returns_soonest_enabled_target() {
        let pool = test_pool().await;
        let now = Utc::now();

        let slow = PollTarget::project("slow");
        let fast = PollTarget::project("fast");
        configure_on_pool(&pool, &slow, true, Duration::from_secs(60), now).await;
        configure_on_pool(&pool, &fast, true, Duration::from_secs(5), now).await;

        let (target, at) = peek_soonest(&pool, TargetKind::Project)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(target, fast);
        assert_eq!(at.timestamp_millis(), now.timestamp_millis() + 5_000);
    }

    #[tokio::test]
    async fn test_peek_ignores_disabled_and_other_kinds() {
        let pool = test_pool().await;
        let now = Utc::now();

        let project = PollTarget::project("web");
        configure_on_pool(&pool, &project, true, Duration::from_secs(5), now).await;
        configure_on_pool(&pool, &project, false, Duration::from_secs(5), now).await;

        let app = PollTarget::application("web", "api");
        configure_on_pool(&pool, &app, true, Duration::from_secs(5), now).await;

        // The disabled project keeps its timestamp but is not due
        let stored = find(&pool, &project).await.unwrap().unwrap();
        assert!(stored.next_poll_at.is_some());
        assert!(!stored.enabled);

        assert_eq!(peek_soonest(&pool, TargetKind::Project).await.unwrap(), None);
        let (target, _) = peek_soonest(&pool, TargetKind::Application)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(target, app);
    }

    #[tokio::test]
    async fn test_disabled_first_write_has_no_next_poll() {
        let pool = test_pool().await;
        let app = PollTarget::application("web", "api");

        let schedule =
            configure_on_pool(&pool, &app, false, Duration::from_secs(5), Utc::now()).await;
        assert_eq!(schedule.next_poll_at, None);
        assert_eq!(
            peek_soonest(&pool, TargetKind::Application).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_advance_moves_next_poll_forward() {
        let pool = test_pool().await;
        let created = Utc::now();
        let target = PollTarget::project("web");
        configure_on_pool(&pool, &target, true, Duration::from_millis(15), created).await;

        let (_, before) = peek_soonest(&pool, TargetKind::Project)
            .await
            .unwrap()
            .unwrap();

        let later = created + chrono::Duration::milliseconds(40);
        assert!(advance(&pool, &target, later).await.unwrap());

        let (_, after) = peek_soonest(&pool, TargetKind::Project)
            .await
            .unwrap()
            .unwrap();
        assert!(after > before);
        assert_eq!(after.timestamp_millis(), later.timestamp_millis() + 15);
    }

    #[tokio::test]
    async fn test_sub_millisecond_interval_still_advances() {
        let pool = test_pool().await;
        let now = Utc::now();
        let target = PollTarget::project("web");
        configure_on_pool(&pool, &target, true, Duration::from_micros(500), now).await;

        assert!(advance(&pool, &target, now).await.unwrap());

        let (_, next) = peek_soonest(&pool, TargetKind::Project)
            .await
            .unwrap()
            .unwrap();
        assert!(next.timestamp_millis() > now.timestamp_millis());
    }

    #[tokio::test]
    async fn test_advance_uses_current_interval() {
        let pool = test_pool().await;
        let now = Utc::now();
        let target = PollTarget::project("web");
        configure_on_pool(&pool, &target, true, Duration::from_secs(10), now).await;
        configure_on_pool(&pool, &target, true, Duration::from_secs(30), now).await;

        advance(&pool, &target, now).await.unwrap();

        let schedule = find(&pool, &target).await.unwrap().unwrap();
        assert_eq!(schedule.interval, Duration::from_secs(30));
        assert_eq!(
            schedule.next_poll_at.unwrap().timestamp_millis(),
            now.timestamp_millis() + 30_000
        );
    }

    #[tokio::test]
    async fn test_advance_unknown_target() {
        let pool = test_pool().await;
        let advanced = advance(&pool, &PollTarget::project("missing"), Utc::now())
            .await
            .unwrap();
        assert!(!advanced);
    }

    #[tokio::test]
    async fn test_peek_and_advance_inside_transaction() {
        let pool = test_pool().await;
        let now = Utc::now();
        let target = PollTarget::project("web");
        configure_on_pool(&pool, &target, true, Duration::from_secs(1), now).await;

        let mut tx = pool.begin().await.unwrap();
        let (peeked, _) = peek_soonest(&mut *tx, TargetKind::Project)
            .await
            .unwrap()
            .unwrap();
        advance(&mut *tx, &peeked, now + chrono::Duration::seconds(5))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let schedule = find(&pool, &target).await.unwrap().unwrap();
        assert_eq!(
            schedule.next_poll_at.unwrap().timestamp_millis(),
            now.timestamp_millis() + 6_000
        );
    }

    #[tokio::test]
    async fn test_delete_by_project_removes_application_schedules() {
        let pool = test_pool().await;
        let now = Utc::now();
        configure_on_pool(&pool, &PollTarget::project("web"), true, Duration::from_secs(1), now)
            .await;
        configure_on_pool(
            &pool,
            &PollTarget::application("web", "api"),
            true,
            Duration::from_secs(1),
            now,
        )
        .await;
        configure_on_pool(&pool, &PollTarget::project("docs"), true, Duration::from_secs(1), now)
            .await;

        assert_eq!(delete_by_project(&pool, "web").await.unwrap(), 2);
        assert_eq!(
            peek_soonest(&pool, TargetKind::Application).await.unwrap(),
            None
        );
        let (remaining, _) = peek_soonest(&pool, TargetKind::Project)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(remaining, PollTarget::project("docs"));
    }

    #[test]
    fn test_configure_policy() {
        let now = Utc::now();
        let interval = Duration::from_secs(10);
        let later = now + chrono::Duration::seconds(10);
        let existing = PollSchedule {
            target: PollTarget::project("web"),
            enabled: true,
            interval,
            next_poll_at: Some(now + chrono::Duration::seconds(3)),
        };

        // First write
        assert_eq!(next_poll_after_configure(None, true, interval, now), Some(later));
        assert_eq!(next_poll_after_configure(None, false, interval, now), None);

        // Unchanged config keeps the pending time
        assert_eq!(
            next_poll_after_configure(Some(&existing), true, interval, now),
            existing.next_poll_at
        );

        // Interval change reschedules immediately
        assert_eq!(
            next_poll_after_configure(Some(&existing), true, Duration::from_secs(20), now),
            Some(now + chrono::Duration::seconds(20))
        );

        // Disabling keeps the stale time
        assert_eq!(
            next_poll_after_configure(Some(&existing), false, interval, now),
            existing.next_poll_at
        );

        // Re-enabling schedules from now
        let disabled = PollSchedule {
            enabled: false,
            ..existing.clone()
        };
        assert_eq!(
            next_poll_after_configure(Some(&disabled), true, interval, now),
            Some(later)
        );
    }
}
