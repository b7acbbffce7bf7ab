//! Storage ports.
//!
//! What the domain services ask of persistence, with the SQLite answers
//! living in tabletalk-infra. Nothing here names a database.

pub mod catalog;
pub mod message;
pub mod prompt;
