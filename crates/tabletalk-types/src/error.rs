use thiserror::Error;

/// Errors from a malformed user-supplied time specification.
///
/// Surfaced verbatim to the user together with a usage hint, so the messages
/// name the expected format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid time format '{0}': expected HH:MM")]
    InvalidFormat(String),

    #[error("time '{0}' out of range: hour must be 00-23 and minute 00-59")]
    OutOfRange(String),

    #[error("invalid hours value '{0}': expected a non-negative whole number")]
    InvalidHours(String),
}

/// Errors from the external game catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog rejected our credentials")]
    Auth,

    #[error("catalog still processing after {attempts} attempts")]
    Busy { attempts: u32 },

    #[error("catalog request failed: {0}")]
    Http(String),

    #[error("catalog response malformed: {0}")]
    Parse(String),
}

/// Errors from repository operations (used by trait definitions in
/// tabletalk-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}
