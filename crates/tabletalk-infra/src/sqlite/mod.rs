//! SQLite-backed stores.
//!
//! One module per core repository trait, all sharing the split
//! reader/writer pool in [`pool`]. Timestamps live in text columns as
//! RFC 3339; the codec pair here keeps every store on the same format.

use chrono::{DateTime, SecondsFormat, Utc};
use tabletalk_types::error::RepositoryError;

pub mod catalog;
pub mod message;
pub mod pool;
pub mod prompt;

/// Render a timestamp for a text column. Fixed-width RFC 3339 so TEXT
/// comparison orders the same as time.
pub(crate) fn encode_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Read a timestamp back out of a text column.
pub(crate) fn decode_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("bad stored timestamp: {e}")))
}

/// Fresh on-disk database for store tests. Hold the directory guard for
/// the duration of the test.
#[cfg(test)]
pub(crate) async fn open_temp_pool() -> (tempfile::TempDir, pool::DatabasePool) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("t.db").display());
    let pool = pool::DatabasePool::new(&url).await.unwrap();
    (dir, pool)
}
