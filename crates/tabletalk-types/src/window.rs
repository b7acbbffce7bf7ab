//! Time-window type used to bound message queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time range `[since, until)`.
///
/// Derived from a user-supplied time spec by the window resolver; never
/// persisted. `until` is the "now" the resolver was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self { since, until }
    }

    /// Span of the window in hours, as a float for display in prompts
    /// ("the last 2.5 hours").
    pub fn hours_covered(&self) -> f64 {
        (self.until - self.since).num_seconds() as f64 / 3600.0
    }
}
