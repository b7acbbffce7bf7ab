//! Message store trait definition.
//!
//! Defines the storage interface for recorded group-chat messages. The
//! infrastructure layer (tabletalk-infra) implements this trait with
//! SQLite persistence.

use chrono::{DateTime, Utc};
use tabletalk_types::error::RepositoryError;
use tabletalk_types::message::{ChatStats, StoredMessage};

/// Repository trait for the rolling message archive.
///
/// Covers two concerns:
/// - **Recording:** idempotent inserts keyed on `(chat_id, message_id)`.
/// - **Querying:** window reads for summaries, aggregate stats, and
///   admin-triggered purges.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MessageStore: Send + Sync {
    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Persist one message. Re-delivery of an already-stored
    /// `(chat_id, message_id)` pair is a no-op, not an error.
    fn record(
        &self,
        message: &StoredMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Get every message in a chat at or after `since`, ordered by
    /// timestamp ascending.
    fn messages_since(
        &self,
        chat_id: i64,
        since: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, RepositoryError>> + Send;

    /// Aggregate archive stats for a chat: total count, earliest
    /// timestamp, and the `top_limit` most talkative senders.
    fn stats(
        &self,
        chat_id: i64,
        top_limit: u32,
    ) -> impl std::future::Future<Output = Result<ChatStats, RepositoryError>> + Send;

    /// Every chat id with at least one stored message, ascending.
    fn chats(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<i64>, RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Purges
    // -----------------------------------------------------------------------

    /// Delete every stored message for a chat. Returns the number deleted.
    fn purge_all(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Delete messages in `[from, to]` inclusive. Returns the number deleted.
    fn purge_range(
        &self,
        chat_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
