//! Incoming message dispatch.
//!
//! One entry point, `Dispatcher::handle`, receives every text message the
//! platform adapter sees. Commands are routed to their handlers; plain
//! group text flows into the message store. Replies go back out through
//! the `ChatGateway` trait so the handlers can acknowledge slow work
//! ("Analyzing...") before the result is ready.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tabletalk_types::event::{IncomingMessage, Reply};
use tabletalk_types::message::StoredMessage;

use crate::access::AccessPolicy;
use crate::catalog::client::CatalogClient;
use crate::catalog::CatalogService;
use crate::command::{parse_command, Command};
use crate::llm::LlmProvider;
use crate::replies;
use crate::repository::catalog::CatalogStore;
use crate::repository::message::MessageStore;
use crate::summary::SummaryService;
use crate::window;

/// How many senders `/stats` lists.
const TOP_SENDERS_LIMIT: u32 = 5;

/// Error from pushing a reply into the chat platform.
#[derive(Debug, thiserror::Error)]
#[error("gateway send failed: {0}")]
pub struct GatewayError(pub String);

/// Outbound side of the chat platform.
///
/// Implemented by the api crate over the Telegram client, and by
/// recording stubs in tests. Uses native async fn in traits (Rust 2024
/// edition, no async_trait macro).
pub trait ChatGateway: Send + Sync {
    /// Deliver one reply to a chat.
    fn send(
        &self,
        chat_id: i64,
        reply: Reply,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;

    /// Whether `user_id` is an administrator (or the owner) of the chat.
    /// Lookup failures count as "not an admin".
    fn is_admin(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> impl std::future::Future<Output = bool> + Send;
}

/// Routes incoming messages to recording or command handling.
pub struct Dispatcher<M, K, C, P> {
    policy: AccessPolicy,
    store: Arc<M>,
    summarizer: SummaryService<P>,
    catalog: CatalogService<K, C, P>,
    max_window_hours: u32,
    bot_username: Option<String>,
}

impl<M, K, C, P> Dispatcher<M, K, C, P>
where
    M: MessageStore,
    K: CatalogClient,
    C: CatalogStore,
    P: LlmProvider,
{
    pub fn new(
        policy: AccessPolicy,
        store: Arc<M>,
        summarizer: SummaryService<P>,
        catalog: CatalogService<K, C, P>,
        max_window_hours: u32,
    ) -> Self {
        Self {
            policy,
            store,
            summarizer,
            catalog,
            max_window_hours,
            bot_username: None,
        }
    }

    /// Set the bot's own @username so commands addressed to other bots
    /// in the same group are ignored.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Handle one incoming text message end to end.
    #[tracing::instrument(
        name = "dispatch",
        skip(self, message, gateway),
        fields(chat_id = message.chat_id, message_id = message.message_id)
    )]
    pub async fn handle<G: ChatGateway>(
        &self,
        message: IncomingMessage,
        gateway: &G,
    ) -> Result<(), GatewayError> {
        if message.text.trim().is_empty() {
            return Ok(());
        }

        match parse_command(&message.text, self.bot_username.as_deref()) {
            Some(command) => {
                if !self.policy.allows(message.chat_id) {
                    tracing::debug!("chat not in allow-list, refusing command");
                    return gateway.send(message.chat_id, replies::denied()).await;
                }
                self.run_command(command, &message, gateway).await
            }
            None => {
                // Unknown slash commands are dropped; anything else is a
                // candidate for the archive.
                if !message.text.trim_start().starts_with('/') {
                    self.record(message).await;
                }
                Ok(())
            }
        }
    }

    async fn run_command<G: ChatGateway>(
        &self,
        command: Command,
        message: &IncomingMessage,
        gateway: &G,
    ) -> Result<(), GatewayError> {
        match command {
            Command::Start | Command::Help => {
                let is_admin = message.chat_kind.is_group()
                    && gateway.is_admin(message.chat_id, message.sender_id).await;
                gateway
                    .send(message.chat_id, replies::welcome(is_admin))
                    .await
            }
            Command::Summary { hours } => self.summary(hours.as_deref(), message, gateway).await,
            Command::Since { time } => self.since(time.as_deref(), message, gateway).await,
            Command::Stats => self.stats(message, gateway).await,
            Command::Game { name } => self.game(&name, message, gateway).await,
            Command::PurgeAll => self.purge_all(message, gateway).await,
            Command::PurgeRange { args } => self.purge_range(&args, message, gateway).await,
        }
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Store a plain text group message. All failures end in the log;
    /// recording never produces replies.
    async fn record(&self, message: IncomingMessage) {
        if !message.chat_kind.is_group() {
            return;
        }
        if !self.policy.allows(message.chat_id) {
            tracing::trace!("chat not in allow-list, not recording");
            return;
        }
        let stored = message.into_stored();
        if let Err(error) = self.store.record(&stored).await {
            tracing::error!(%error, "failed to record message");
        }
    }

    // -----------------------------------------------------------------------
    // Summaries
    // -----------------------------------------------------------------------

    async fn summary<G: ChatGateway>(
        &self,
        hours_arg: Option<&str>,
        message: &IncomingMessage,
        gateway: &G,
    ) -> Result<(), GatewayError> {
        if !message.chat_kind.is_group() {
            return gateway.send(message.chat_id, replies::group_only()).await;
        }

        let resolved = match window::resolve_relative(Utc::now(), hours_arg, self.max_window_hours)
        {
            Ok(resolved) => resolved,
            Err(error) => {
                tracing::debug!(%error, "rejected summary window");
                let raw = hours_arg.unwrap_or_default();
                return gateway.send(message.chat_id, replies::invalid_hours(raw)).await;
            }
        };

        if resolved.clamped {
            gateway
                .send(message.chat_id, replies::window_clamped(self.max_window_hours))
                .await?;
        }
        gateway
            .send(message.chat_id, replies::analyzing_hours(resolved.hours))
            .await?;

        let messages = self.window_messages(message.chat_id, resolved.window.since).await;
        if messages.is_empty() {
            return gateway
                .send(message.chat_id, replies::no_messages_hours(resolved.hours))
                .await;
        }

        let body = self
            .summarizer
            .summarize(&messages, resolved.window.hours_covered())
            .await;
        gateway
            .send(
                message.chat_id,
                replies::summary_hours(resolved.hours, messages.len(), &body),
            )
            .await
    }

    async fn since<G: ChatGateway>(
        &self,
        time_arg: Option<&str>,
        message: &IncomingMessage,
        gateway: &G,
    ) -> Result<(), GatewayError> {
        if !message.chat_kind.is_group() {
            return gateway.send(message.chat_id, replies::group_only()).await;
        }
        let Some(spec) = time_arg else {
            return gateway.send(message.chat_id, replies::since_usage()).await;
        };

        let window = match window::resolve_since(Utc::now(), spec) {
            Ok(window) => window,
            Err(error) => {
                tracing::debug!(%error, "rejected since window");
                return gateway.send(message.chat_id, replies::invalid_time(spec)).await;
            }
        };

        gateway
            .send(message.chat_id, replies::analyzing_since(spec))
            .await?;

        let messages = self.window_messages(message.chat_id, window.since).await;
        if messages.is_empty() {
            return gateway
                .send(message.chat_id, replies::no_messages_since(spec))
                .await;
        }

        let body = self
            .summarizer
            .summarize(&messages, window.hours_covered())
            .await;
        gateway
            .send(
                message.chat_id,
                replies::summary_since(spec, messages.len(), &body),
            )
            .await
    }

    /// Window read with the store's failure mode: an error is logged and
    /// the caller sees an empty window.
    async fn window_messages(&self, chat_id: i64, since: DateTime<Utc>) -> Vec<StoredMessage> {
        match self.store.messages_since(chat_id, since).await {
            Ok(messages) => messages,
            Err(error) => {
                tracing::error!(%error, "window query failed");
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    async fn stats<G: ChatGateway>(
        &self,
        message: &IncomingMessage,
        gateway: &G,
    ) -> Result<(), GatewayError> {
        if !message.chat_kind.is_group() {
            return gateway.send(message.chat_id, replies::group_only()).await;
        }
        match self.store.stats(message.chat_id, TOP_SENDERS_LIMIT).await {
            Ok(stats) if stats.total_messages == 0 => {
                gateway.send(message.chat_id, replies::stats_empty()).await
            }
            Ok(stats) => {
                gateway
                    .send(message.chat_id, replies::stats(&stats, Utc::now()))
                    .await
            }
            Err(error) => {
                tracing::error!(%error, "stats query failed");
                gateway.send(message.chat_id, replies::stats_empty()).await
            }
        }
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    async fn game<G: ChatGateway>(
        &self,
        name: &str,
        message: &IncomingMessage,
        gateway: &G,
    ) -> Result<(), GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return gateway.send(message.chat_id, replies::game_usage()).await;
        }

        gateway
            .send(message.chat_id, replies::game_searching(name))
            .await?;

        match self.catalog.lookup(name).await {
            Ok(Some(entry)) => {
                gateway
                    .send(message.chat_id, replies::game_details(&entry))
                    .await
            }
            Ok(None) => {
                gateway
                    .send(message.chat_id, replies::game_not_found(name))
                    .await
            }
            Err(error) => {
                // Credential and transport problems are ours, not the
                // user's; they read as "not found" in chat.
                tracing::warn!(%error, "catalog lookup failed");
                gateway
                    .send(message.chat_id, replies::game_not_found(name))
                    .await
            }
        }
    }

    // -----------------------------------------------------------------------
    // Purges
    // -----------------------------------------------------------------------

    async fn purge_all<G: ChatGateway>(
        &self,
        message: &IncomingMessage,
        gateway: &G,
    ) -> Result<(), GatewayError> {
        if !message.chat_kind.is_group() {
            return gateway.send(message.chat_id, replies::group_only()).await;
        }
        if !gateway.is_admin(message.chat_id, message.sender_id).await {
            return gateway.send(message.chat_id, replies::admin_only()).await;
        }

        match self.store.purge_all(message.chat_id).await {
            Ok(0) => gateway.send(message.chat_id, replies::purge_none()).await,
            Ok(deleted) => {
                tracing::info!(deleted, "purged chat archive");
                gateway
                    .send(message.chat_id, replies::purge_all_done(deleted))
                    .await
            }
            Err(error) => {
                tracing::error!(%error, "purge failed");
                gateway.send(message.chat_id, replies::purge_failed()).await
            }
        }
    }

    async fn purge_range<G: ChatGateway>(
        &self,
        args: &[String],
        message: &IncomingMessage,
        gateway: &G,
    ) -> Result<(), GatewayError> {
        if !message.chat_kind.is_group() {
            return gateway.send(message.chat_id, replies::group_only()).await;
        }
        if !gateway.is_admin(message.chat_id, message.sender_id).await {
            return gateway.send(message.chat_id, replies::admin_only()).await;
        }

        let [from_raw, to_raw] = args else {
            return gateway
                .send(message.chat_id, replies::purge_range_usage())
                .await;
        };
        let (Ok(from), Ok(to)) = (parse_date(from_raw), parse_date(to_raw)) else {
            return gateway
                .send(message.chat_id, replies::purge_range_usage())
                .await;
        };
        if from > to {
            return gateway
                .send(message.chat_id, replies::purge_range_order())
                .await;
        }

        let from_start = from.and_time(NaiveTime::MIN).and_utc();
        let to_end = to.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::seconds(1);

        match self
            .store
            .purge_range(message.chat_id, from_start, to_end)
            .await
        {
            Ok(0) => {
                gateway
                    .send(message.chat_id, replies::purge_range_none(from_raw, to_raw))
                    .await
            }
            Ok(deleted) => {
                tracing::info!(deleted, %from_start, %to_end, "purged date range");
                gateway
                    .send(
                        message.chat_id,
                        replies::purge_range_done(deleted, from_raw, to_raw),
                    )
                    .await
            }
            Err(error) => {
                tracing::error!(%error, "range purge failed");
                gateway.send(message.chat_id, replies::purge_failed()).await
            }
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
