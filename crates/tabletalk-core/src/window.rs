//! Resolving user-supplied time expressions into concrete windows.
//!
//! Two forms are supported: a relative look-back in whole hours
//! (`/summary 6`) and a wall-clock start time (`/since 14:30`). Both
//! resolve against a caller-supplied "now" so the logic stays
//! deterministic under test.

use chrono::{DateTime, Duration, Timelike, Utc};
use tabletalk_types::error::WindowError;
use tabletalk_types::window::TimeWindow;

/// How many hours a relative summary covers when no argument is given.
pub const DEFAULT_HOURS: u32 = 24;

/// A relative window after clamping against the configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub window: TimeWindow,
    /// Hours actually covered, after clamping.
    pub hours: u32,
    /// True when the request exceeded the ceiling and was reduced.
    pub clamped: bool,
}

/// Resolve a relative look-back expressed in whole hours.
///
/// `requested` is the raw command argument, if any. Values above
/// `max_hours` are clamped rather than rejected; anything that is not a
/// non-negative integer is an error.
pub fn resolve_relative(
    now: DateTime<Utc>,
    requested: Option<&str>,
    max_hours: u32,
) -> Result<ResolvedWindow, WindowError> {
    let requested_hours = match requested {
        None => DEFAULT_HOURS,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| WindowError::InvalidHours(raw.to_string()))?,
    };

    let clamped = requested_hours > max_hours;
    let hours = requested_hours.min(max_hours);
    let since = now - Duration::hours(i64::from(hours));

    Ok(ResolvedWindow {
        window: TimeWindow::new(since, now),
        hours,
        clamped,
    })
}

/// Resolve an `HH:MM` expression to the most recent past occurrence of
/// that wall-clock time: today if it has already passed, otherwise
/// yesterday.
pub fn resolve_since(now: DateTime<Utc>, spec: &str) -> Result<TimeWindow, WindowError> {
    let (hour, minute) = parse_clock(spec)?;

    let mut start = now
        .with_hour(hour)
        .and_then(|t| t.with_minute(minute))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .ok_or_else(|| WindowError::OutOfRange(spec.to_string()))?;

    if start > now {
        start -= Duration::days(1);
    }

    Ok(TimeWindow::new(start, now))
}

fn parse_clock(spec: &str) -> Result<(u32, u32), WindowError> {
    let mut parts = spec.splitn(2, ':');
    let (Some(hour_part), Some(minute_part)) = (parts.next(), parts.next()) else {
        return Err(WindowError::InvalidFormat(spec.to_string()));
    };

    let hour = hour_part
        .parse::<u32>()
        .map_err(|_| WindowError::InvalidFormat(spec.to_string()))?;
    let minute = minute_part
        .parse::<u32>()
        .map_err(|_| WindowError::InvalidFormat(spec.to_string()))?;

    if hour > 23 || minute > 59 {
        return Err(WindowError::OutOfRange(spec.to_string()));
    }

    Ok((hour, minute))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
