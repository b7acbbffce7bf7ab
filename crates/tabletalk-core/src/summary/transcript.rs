//! Rendering stored messages into model-readable transcripts.

use tabletalk_types::message::StoredMessage;

/// Most messages ever included in one transcript. Long windows keep the
/// most recent ones so the summary reflects where the conversation ended
/// up.
pub const MAX_TRANSCRIPT_MESSAGES: usize = 200;

/// The newest `MAX_TRANSCRIPT_MESSAGES` of an ascending-ordered slice.
pub fn recent(messages: &[StoredMessage]) -> &[StoredMessage] {
    let start = messages.len().saturating_sub(MAX_TRANSCRIPT_MESSAGES);
    &messages[start..]
}

/// One `[HH:MM] name: text` line per message, oldest first.
pub fn render(messages: &[StoredMessage]) -> String {
    let mut lines = Vec::with_capacity(messages.len());
    for message in messages {
        lines.push(format!(
            "[{}] {}: {}",
            message.timestamp.format("%H:%M"),
            message.display_name(),
            message.text
        ));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
