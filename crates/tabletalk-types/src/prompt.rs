//! Discussion-prompt types for TableTalk.
//!
//! The bot carries a catalog of board-game discussion questions and posts one
//! per configured chat on a schedule. Deliveries are recorded append-only so
//! a (chat, prompt) pair is not repeated inside the cooldown window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discussion question the bot can post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionPrompt {
    /// Stable identifier, used as the dedup key in the delivery log.
    pub id: String,
    /// The question text as posted.
    pub text: String,
}

impl DiscussionPrompt {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Record of one prompt sent to one chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDelivery {
    pub chat_id: i64,
    pub prompt_id: String,
    pub sent_at: DateTime<Utc>,
}
