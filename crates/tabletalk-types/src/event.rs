//! Platform-boundary event types for TableTalk.
//!
//! The core never talks to a messaging platform directly. Adapters translate
//! platform updates into `IncomingMessage` values and turn `Reply` values back
//! into platform sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{StoredMessage, display_name};

/// The kind of chat an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    /// Group and supergroup chats are the only places the bot records and
    /// summarizes messages.
    pub fn is_group(&self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// A single message event received from the messaging platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Platform chat identifier.
    pub chat_id: i64,
    /// What kind of chat the message arrived in.
    pub chat_kind: ChatKind,
    /// Platform message identifier, unique within the chat.
    pub message_id: i64,
    /// Platform identifier of the sender.
    pub sender_id: i64,
    /// Sender handle, when the platform reports one.
    pub sender_username: Option<String>,
    /// Sender first name (always present on the platforms we support).
    pub sender_first_name: String,
    /// Message text. Empty for non-text messages, which adapters filter out.
    pub text: String,
    /// Platform timestamp of the message.
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    /// `@username` when the sender has a handle, first name otherwise.
    pub fn display_name(&self) -> String {
        display_name(self.sender_username.as_deref(), &self.sender_first_name)
    }

    /// Convert into the persisted message record.
    pub fn into_stored(self) -> StoredMessage {
        StoredMessage {
            chat_id: self.chat_id,
            message_id: self.message_id,
            sender_id: self.sender_id,
            username: self.sender_username,
            first_name: self.sender_first_name,
            text: self.text,
            timestamp: self.timestamp,
        }
    }
}

/// Text markup mode for an outgoing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    Plain,
    Markdown,
}

/// An outgoing reply produced by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub markup: Markup,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Plain,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Markdown,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn event(username: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            chat_id: -100123,
            chat_kind: ChatKind::Supergroup,
            message_id: 42,
            sender_id: 7,
            sender_username: username.map(str::to_string),
            sender_first_name: "Ana".to_string(),
            text: "anyone up for a game night?".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_chat_kind_is_group() {
        assert!(ChatKind::Group.is_group());
        assert!(ChatKind::Supergroup.is_group());
        assert!(!ChatKind::Private.is_group());
        assert!(!ChatKind::Channel.is_group());
    }

    #[test]
    fn test_display_name_prefers_username() {
        assert_eq!(event(Some("ana_g")).display_name(), "@ana_g");
        assert_eq!(event(None).display_name(), "Ana");
    }

    #[test]
    fn test_into_stored_carries_all_fields() {
        let stored = event(Some("ana_g")).into_stored();
        assert_eq!(stored.chat_id, -100123);
        assert_eq!(stored.message_id, 42);
        assert_eq!(stored.sender_id, 7);
        assert_eq!(stored.username.as_deref(), Some("ana_g"));
        assert_eq!(stored.first_name, "Ana");
        assert_eq!(stored.text, "anyone up for a game night?");
    }

    #[test]
    fn test_reply_constructors() {
        let plain = Reply::plain("hello");
        assert_eq!(plain.markup, Markup::Plain);
        let md = Reply::markdown("**hello**");
        assert_eq!(md.markup, Markup::Markdown);
        assert_eq!(md.text, "**hello**");
    }

    #[test]
    fn test_chat_kind_serde() {
        let json = serde_json::to_string(&ChatKind::Supergroup).unwrap();
        assert_eq!(json, "\"supergroup\"");
        let parsed: ChatKind = serde_json::from_str("\"private\"").unwrap();
        assert_eq!(parsed, ChatKind::Private);
    }
}
