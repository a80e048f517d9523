//! Orchestrator configuration
//!
//! Defines all configurable parameters for the orchestrator including
//! the database location, the HTTP bind address and poll scheduler tuning.

use keel_core::interval::parse_interval;
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL (e.g., "sqlite://keel.db?mode=rwc")
    pub database_url: String,

    /// Address the HTTP API listens on
    pub bind_addr: String,

    /// Poll scheduler settings
    pub scheduler: SchedulerConfig,
}

/// Poll scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How long a loop sleeps when nothing is due, or after a store error
    pub idle_interval: Duration,

    /// Age after which a queued or running poll job stops blocking new polls
    ///
    /// `None` means outstanding jobs block indefinitely.
    pub stale_job_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_secs(5),
            stale_job_timeout: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(database_url: String, bind_addr: String) -> Self {
        Self {
            database_url,
            bind_addr,
            scheduler: SchedulerConfig::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DATABASE_URL (optional, default: sqlite://keel.db?mode=rwc)
    /// - ORCHESTRATOR_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - POLL_IDLE_INTERVAL_MS (optional, milliseconds, default: 5000)
    /// - POLL_STALE_JOB_TIMEOUT (optional, interval such as "30m", default: unset)
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://keel.db?mode=rwc".to_string());

        let bind_addr =
            std::env::var("ORCHESTRATOR_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let idle_interval = std::env::var("POLL_IDLE_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(5));

        let stale_job_timeout = match std::env::var("POLL_STALE_JOB_TIMEOUT") {
            Ok(value) => Some(parse_interval(&value).map_err(|e| {
                anyhow::anyhow!("POLL_STALE_JOB_TIMEOUT is not a valid interval: {}", e)
            })?),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            scheduler: SchedulerConfig {
                idle_interval,
                stale_job_timeout,
            },
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("database_url cannot be empty");
        }

        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!("database_url must start with sqlite:");
        }

        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.scheduler.idle_interval.is_zero() {
            anyhow::bail!("idle_interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            "sqlite://keel.db?mode=rwc".to_string(),
            "0.0.0.0:8080".to_string(),
        )
    }
}
