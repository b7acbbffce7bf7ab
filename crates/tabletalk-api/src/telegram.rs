//! Telegram adapter: update conversion, reply delivery, dispatch loop.
//!
//! The only file that talks to teloxide. Incoming updates are flattened
//! into `IncomingMessage` values for the core dispatcher; replies come
//! back out through `TelegramGateway`, which splits long text to fit the
//! platform's message size cap.

use std::sync::Arc;

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::{Requester, ResponseResult};
use teloxide::types::{BotCommand, ChatId, Message, ParseMode, UserId};
use teloxide::Bot;

use tabletalk_core::dispatch::{ChatGateway, GatewayError};
use tabletalk_types::event::{ChatKind, IncomingMessage, Markup, Reply};

use crate::state::ConcreteDispatcher;

/// Telegram rejects messages longer than this many UTF-16 code units.
pub(crate) const TELEGRAM_MAX_LENGTH: usize = 4096;

// ---------------------------------------------------------------------------
// Outbound: gateway
// ---------------------------------------------------------------------------

/// `ChatGateway` over the Telegram HTTP client.
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send_part(
        &self,
        chat_id: i64,
        part: String,
        markup: Markup,
    ) -> Result<(), GatewayError> {
        let result = match markup {
            Markup::Plain => self.bot.send_message(ChatId(chat_id), &part).await,
            Markup::Markdown => {
                self.bot
                    .send_message(ChatId(chat_id), &part)
                    .parse_mode(ParseMode::Markdown)
                    .await
            }
        };

        match result {
            Ok(_) => Ok(()),
            Err(error) if markup == Markup::Markdown => {
                // Unbalanced markup (asterisks in game names, usually)
                // breaks Telegram's parser. Deliver unformatted rather
                // than not at all.
                tracing::warn!(%error, "markdown send failed, retrying as plain text");
                self.bot
                    .send_message(ChatId(chat_id), &part)
                    .await
                    .map(|_| ())
                    .map_err(|e| GatewayError(e.to_string()))
            }
            Err(error) => Err(GatewayError(error.to_string())),
        }
    }
}

impl ChatGateway for TelegramGateway {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<(), GatewayError> {
        for part in split_reply_text(&reply.text) {
            self.send_part(chat_id, part, reply.markup).await?;
        }
        Ok(())
    }

    async fn is_admin(&self, chat_id: i64, user_id: i64) -> bool {
        match self
            .bot
            .get_chat_member(ChatId(chat_id), UserId(user_id as u64))
            .await
        {
            Ok(member) => member.is_privileged(),
            Err(error) => {
                tracing::warn!(%error, chat_id, user_id, "admin lookup failed");
                false
            }
        }
    }
}

/// Split reply text into parts below `TELEGRAM_MAX_LENGTH`, preferring to
/// break at a newline in the back half of each part. Lengths are counted
/// in UTF-16 code units because that is what Telegram counts.
pub fn split_reply_text(text: &str) -> Vec<String> {
    let utf16 = text.encode_utf16().collect::<Vec<_>>();
    let total_len = utf16.len();

    if total_len <= TELEGRAM_MAX_LENGTH {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut start = 0;

    while start < total_len {
        let mut end = (start + TELEGRAM_MAX_LENGTH).min(total_len);

        if end < total_len {
            let search_start = start + TELEGRAM_MAX_LENGTH / 2;
            if let Some(newline_pos) = utf16[search_start..end]
                .iter()
                .rposition(|&c| c == b'\n' as u16)
            {
                end = search_start + newline_pos + 1;
            }
        }

        parts.push(String::from_utf16_lossy(&utf16[start..end]));
        start = end;
    }

    parts
}

// ---------------------------------------------------------------------------
// Inbound: update conversion
// ---------------------------------------------------------------------------

/// Flatten a Telegram message into the platform-neutral event, or `None`
/// for updates the bot ignores (no sender, no text).
fn to_incoming(msg: &Message) -> Option<IncomingMessage> {
    let sender = msg.from.as_ref()?;
    let text = msg.text()?;

    let chat_kind = if msg.chat.is_supergroup() {
        ChatKind::Supergroup
    } else if msg.chat.is_group() {
        ChatKind::Group
    } else if msg.chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Private
    };

    Some(IncomingMessage {
        chat_id: msg.chat.id.0,
        chat_kind,
        message_id: i64::from(msg.id.0),
        sender_id: sender.id.0 as i64,
        sender_username: sender.username.clone(),
        sender_first_name: sender.first_name.clone(),
        text: text.to_string(),
        timestamp: msg.date,
    })
}

async fn handle_update(
    msg: Message,
    dispatcher: Arc<ConcreteDispatcher>,
    gateway: Arc<TelegramGateway>,
) -> ResponseResult<()> {
    let Some(incoming) = to_incoming(&msg) else {
        return Ok(());
    };
    if let Err(error) = dispatcher.handle(incoming, gateway.as_ref()).await {
        tracing::error!(%error, chat_id = msg.chat.id.0, "failed to deliver reply");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dispatch loop
// ---------------------------------------------------------------------------

/// The command menu shown by Telegram clients.
fn command_menu() -> Vec<BotCommand> {
    vec![
        BotCommand::new("summary", "Summarize the last N hours (default 24)"),
        BotCommand::new("since", "Summarize from a time or date onward"),
        BotCommand::new("stats", "Archive statistics for this chat"),
        BotCommand::new("game", "Look up a board game by name"),
        BotCommand::new("help", "Show usage help"),
    ]
}

/// Run the long-polling update loop until Ctrl+C.
///
/// Registration of the command menu is best-effort; a failure there
/// should not keep the bot from answering.
pub async fn run_dispatch(
    bot: Bot,
    dispatcher: Arc<ConcreteDispatcher>,
    gateway: Arc<TelegramGateway>,
) {
    if let Err(error) = bot.set_my_commands(command_menu()).await {
        tracing::warn!(%error, "failed to register command menu");
    }

    let handler = teloxide::prelude::Update::filter_message().endpoint(handle_update);

    teloxide::prelude::Dispatcher::builder(bot, handler)
        .dependencies(teloxide::prelude::dptree::deps![dispatcher, gateway])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_part() {
        let parts = split_reply_text("hello");
        assert_eq!(parts, vec!["hello".to_string()]);
    }

    #[test]
    fn test_exact_limit_is_one_part() {
        let text = "a".repeat(TELEGRAM_MAX_LENGTH);
        assert_eq!(split_reply_text(&text).len(), 1);
    }

    #[test]
    fn test_long_text_splits_under_limit() {
        let text = "a".repeat(TELEGRAM_MAX_LENGTH * 2 + 100);
        let parts = split_reply_text(&text);
        assert!(parts.len() >= 3);
        for part in &parts {
            assert!(part.encode_utf16().count() <= TELEGRAM_MAX_LENGTH);
        }
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_split_prefers_newline_in_back_half() {
        let mut text = "a".repeat(3000);
        text.push('\n');
        text.push_str(&"b".repeat(3000));

        let parts = split_reply_text(&text);
        assert_eq!(parts.len(), 2);
        assert!(parts[0].ends_with('\n'));
        assert_eq!(parts[1], "b".repeat(3000));
    }

    #[test]
    fn test_split_counts_utf16_units() {
        // Each emoji is 2 UTF-16 units, so 3000 of them exceed the cap.
        let text = "🎲".repeat(3000);
        let parts = split_reply_text(&text);
        assert!(parts.len() >= 2);
        for part in &parts {
            assert!(part.encode_utf16().count() <= TELEGRAM_MAX_LENGTH);
        }
        assert_eq!(parts.concat(), text);
    }
}
