//! Stored chat message types for TableTalk.
//!
//! `StoredMessage` is the durable record the bot keeps for every text message
//! observed in a group. The store is append-only and idempotent on
//! (chat_id, message_id); an administrator purge is the only delete path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as persisted in the message store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Chat the message belongs to.
    pub chat_id: i64,
    /// Platform message id, unique within the chat.
    pub message_id: i64,
    /// Platform id of the author.
    pub sender_id: i64,
    /// Author handle, when set.
    pub username: Option<String>,
    /// Author first name.
    pub first_name: String,
    /// Message text.
    pub text: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
}

impl StoredMessage {
    /// `@username` when the author has a handle, first name otherwise.
    pub fn display_name(&self) -> String {
        display_name(self.username.as_deref(), &self.first_name)
    }
}

/// Display-name rule shared by stored messages, incoming events, and stats.
pub fn display_name(username: Option<&str>, first_name: &str) -> String {
    match username {
        Some(handle) if !handle.is_empty() => format!("@{handle}"),
        _ => first_name.to_string(),
    }
}

/// Message count for one author, used by the stats surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderActivity {
    pub username: Option<String>,
    pub first_name: String,
    pub message_count: u64,
}

impl SenderActivity {
    pub fn display_name(&self) -> String {
        display_name(self.username.as_deref(), &self.first_name)
    }
}

/// Aggregate statistics for one chat's stored messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStats {
    /// Total stored messages for the chat.
    pub total_messages: u64,
    /// Timestamp of the oldest stored message, if any.
    pub earliest: Option<DateTime<Utc>>,
    /// Most active authors, highest message count first, capped by the query.
    pub top_senders: Vec<SenderActivity>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_with_username() {
        assert_eq!(display_name(Some("boardgamer"), "Luis"), "@boardgamer");
    }

    #[test]
    fn test_display_name_without_username() {
        assert_eq!(display_name(None, "Luis"), "Luis");
        assert_eq!(display_name(Some(""), "Luis"), "Luis");
    }

    #[test]
    fn test_stored_message_serde_roundtrip() {
        let msg = StoredMessage {
            chat_id: -100987,
            message_id: 15,
            sender_id: 3,
            username: Some("meeple".to_string()),
            first_name: "Marta".to_string(),
            text: "wingspan tonight?".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: StoredMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.message_id, 15);
        assert_eq!(parsed.display_name(), "@meeple");
    }

    #[test]
    fn test_sender_activity_display_name() {
        let activity = SenderActivity {
            username: None,
            first_name: "Pau".to_string(),
            message_count: 12,
        };
        assert_eq!(activity.display_name(), "Pau");
    }

    #[test]
    fn test_chat_stats_serde_roundtrip() {
        let stats = ChatStats {
            total_messages: 240,
            earliest: Some(Utc::now()),
            top_senders: vec![SenderActivity {
                username: Some("meeple".to_string()),
                first_name: "Marta".to_string(),
                message_count: 80,
            }],
        };
        let json = serde_json::to_string(&stats).unwrap();
        let parsed: ChatStats = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_messages, 240);
        assert_eq!(parsed.top_senders.len(), 1);
    }
}
