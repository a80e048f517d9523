//! Poll interval parsing
//!
//! Operators configure poll intervals as human-readable strings such as
//! `"15ms"`, `"30s"`, `"5m"` or `"2h 30min"`.

use std::time::Duration;
use thiserror::Error;

/// Errors produced while parsing a poll interval
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    /// No interval was supplied
    #[error("poll interval is empty")]
    Empty,

    /// The interval string could not be parsed
    #[error("invalid poll interval {input:?}: {reason}")]
    Invalid { input: String, reason: String },

    /// The interval is shorter than the schedule's millisecond resolution
    #[error("poll interval must be at least 1ms")]
    TooShort,
}

/// Shortest accepted interval
///
/// Schedules are stored with millisecond resolution.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Parse a human-readable interval into a [`Duration`]
pub fn parse_interval(input: &str) -> Result<Duration, IntervalError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IntervalError::Empty);
    }

    let duration = humantime::parse_duration(trimmed).map_err(|e| IntervalError::Invalid {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if duration < MIN_INTERVAL {
        return Err(IntervalError::TooShort);
    }

    Ok(duration)
}
