//! The `ttalk run` command: the bot itself.
//!
//! Brings up the three long-lived pieces -- the keep-alive HTTP server,
//! the discussion-prompt scheduler, and the Telegram long-polling loop --
//! and tears them down again when polling ends.

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use secrecy::ExposeSecret;
use teloxide::prelude::Requester;
use teloxide::Bot;

use tabletalk_core::prompt::scheduler::{self, PromptCallback};
use tabletalk_core::prompt::PromptScheduler;
use tabletalk_infra::llm::test_provider_connection;
use tabletalk_infra::secret;

use crate::http;
use crate::state::{AppState, ConcretePromptService};
use crate::telegram::{self, TelegramGateway};

/// Start the bot and block until Ctrl+C.
pub async fn run(state: &AppState) -> Result<()> {
    let token = secret::bot_token()?;
    let bot = Bot::new(token.expose_secret());

    let me = bot
        .get_me()
        .await
        .context("could not reach Telegram; is the bot token valid?")?;
    let username = me.username().to_string();

    let provider = state.llm_provider()?;
    if let Err(error) = test_provider_connection(provider.as_ref(), &state.config.llm.model).await {
        tracing::warn!(%error, "LLM provider check failed; summaries will fail until it recovers");
    }

    let dispatcher = Arc::new(state.dispatcher(Arc::clone(&provider), Some(username.clone())));
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));

    // Keep-alive server, answering uptime pingers in the background.
    let addr = format!("{}:{}", state.config.server.bind, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind keep-alive server to {addr}"))?;
    let server = tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, http::router::build_router()).await {
            tracing::error!(%error, "keep-alive server exited");
        }
    });

    let prompt_scheduler = PromptScheduler::new();
    start_prompt_schedule(state, &prompt_scheduler, &gateway).await;

    println!();
    println!(
        "  {} TableTalk v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("  Bot:        {}", style(format!("@{username}")).cyan());
    println!(
        "  Keep-alive: {}",
        style(format!("http://{addr}")).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());
    println!();

    // Long polling runs in the foreground; Ctrl+C ends it.
    telegram::run_dispatch(bot, dispatcher, gateway).await;

    if let Err(error) = prompt_scheduler.stop().await {
        tracing::warn!(%error, "prompt scheduler did not stop cleanly");
    }
    server.abort();

    println!("\n  Bot stopped.");
    Ok(())
}

/// Bring up the prompt schedule, delivering a catch-up round first when
/// the bot slept through one.
async fn start_prompt_schedule(
    state: &AppState,
    prompt_scheduler: &PromptScheduler,
    gateway: &Arc<TelegramGateway>,
) {
    let prompts = &state.config.prompts;
    if !prompts.enabled {
        tracing::info!("discussion prompts disabled in config");
        return;
    }
    if prompts.chats.is_empty() {
        tracing::info!("no prompt chats configured, scheduler not started");
        return;
    }

    let service = Arc::new(state.prompt_service());
    let chats = prompts.chats.clone();

    deliver_missed_round(&service, gateway, &chats, &prompts.schedule).await;

    let cb_service = Arc::clone(&service);
    let cb_gateway = Arc::clone(gateway);
    let cb_chats = chats.clone();
    let callback: PromptCallback = Arc::new(move |_fired_at| {
        let service = Arc::clone(&cb_service);
        let gateway = Arc::clone(&cb_gateway);
        let chats = cb_chats.clone();
        Box::pin(async move {
            service.deliver_round(&chats, gateway.as_ref()).await;
        })
    });

    if let Err(error) = prompt_scheduler.start(&prompts.schedule, callback).await {
        tracing::error!(%error, schedule = %prompts.schedule, "prompt scheduler failed to start");
    }
}

/// One catch-up round when a scheduled fire time passed while the bot was
/// down. A chat that has never received a round waits for the first
/// scheduled one instead.
async fn deliver_missed_round(
    service: &ConcretePromptService,
    gateway: &TelegramGateway,
    chats: &[i64],
    schedule: &str,
) {
    let last = match service.last_round(chats).await {
        Ok(Some(last)) => last,
        Ok(None) => return,
        Err(error) => {
            tracing::warn!(%error, "could not read prompt history, skipping catch-up check");
            return;
        }
    };

    match scheduler::missed_runs(schedule, last) {
        Ok(missed) if !missed.is_empty() => {
            tracing::info!(
                missed = missed.len(),
                "delivering catch-up prompt round"
            );
            service.deliver_round(chats, gateway).await;
        }
        Ok(_) => {}
        Err(error) => {
            tracing::warn!(%error, "missed-run check failed");
        }
    }
}
