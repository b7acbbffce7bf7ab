//! Archive status dashboard command.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use tabletalk_core::repository::message::MessageStore;
use tabletalk_types::message::ChatStats;

use crate::state::AppState;

/// How many senders the dashboard names per chat.
const TOP_SENDERS: u32 = 3;

/// Display archive statistics per chat, plus active configuration.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let chat_ids = state.messages.chats().await?;

    let mut chats: Vec<(i64, ChatStats)> = Vec::with_capacity(chat_ids.len());
    for chat_id in chat_ids {
        let stats = state.messages.stats(chat_id, TOP_SENDERS).await?;
        chats.push((chat_id, stats));
    }

    if json {
        let chats: Vec<serde_json::Value> = chats
            .iter()
            .map(|(chat_id, stats)| {
                serde_json::json!({
                    "chat_id": chat_id,
                    "messages": stats.total_messages,
                    "earliest": stats.earliest,
                    "top_senders": stats.top_senders,
                })
            })
            .collect();
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "provider": state.config.llm.provider,
            "model": state.config.llm.model,
            "allowed_chats": state.config.access.allowed_chats.len(),
            "prompts_enabled": state.config.prompts.enabled,
            "chats": chats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} TableTalk v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Archive ──").dim());
    if chats.is_empty() {
        println!("  No messages recorded yet.");
    } else {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Chat").fg(Color::White),
            Cell::new("Messages").fg(Color::White),
            Cell::new("Since").fg(Color::White),
            Cell::new("Most active").fg(Color::White),
        ]);

        for (chat_id, stats) in &chats {
            let earliest = match &stats.earliest {
                Some(dt) => dt.format("%Y-%m-%d").to_string(),
                None => "-".to_string(),
            };
            let top = stats
                .top_senders
                .iter()
                .map(|s| format!("{} ({})", s.display_name(), s.message_count))
                .collect::<Vec<_>>()
                .join(", ");

            table.add_row(vec![
                Cell::new(chat_id).fg(Color::Cyan),
                Cell::new(stats.total_messages),
                Cell::new(earliest).fg(Color::DarkGrey),
                Cell::new(top),
            ]);
        }

        println!("{table}");
    }
    println!();

    println!("  {}", style("── Config ──").dim());
    println!(
        "  Provider: {} ({})",
        style(&state.config.llm.provider).bold(),
        state.config.llm.model
    );
    let allowed = state.config.access.allowed_chats.len();
    if allowed == 0 {
        println!("  Access:   {}", style("unrestricted").yellow());
    } else {
        println!(
            "  Access:   {} allowed chat{}",
            style(allowed).green(),
            if allowed == 1 { "" } else { "s" }
        );
    }
    if state.config.prompts.enabled {
        println!(
            "  Prompts:  {} ({})",
            style("enabled").green(),
            state.config.prompts.schedule
        );
    } else {
        println!("  Prompts:  {}", style("disabled").dim());
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!();

    Ok(())
}
