//! Every user-facing reply the bot sends.
//!
//! One function per reply keeps wording in a single place. Formatted
//! replies use Telegram's legacy Markdown; anything that echoes raw user
//! input goes out as plain text so stray asterisks can't break parsing.

use chrono::{DateTime, Utc};
use tabletalk_types::catalog::GameEntry;
use tabletalk_types::event::Reply;
use tabletalk_types::message::ChatStats;
use tabletalk_types::prompt::DiscussionPrompt;

/// `/start` and `/help`. The admin section only shows for admins.
pub fn welcome(is_admin: bool) -> Reply {
    let mut text = String::from(
        "👋 *Hi! I'm TableTalk.*\n\n\
         I keep track of this group's conversation and summarize it on demand.\n\n\
         *Commands*\n\
         /summary [hours] - Summarize the last N hours (default 24)\n\
         /since HH:MM - Summarize everything since a time of day\n\
         /stats - Archive stats for this group\n\
         /game <name> - Board-game card from the catalog\n",
    );
    if is_admin {
        text.push_str(
            "\n*Admin commands*\n\
             /purge_all - Delete every stored message\n\
             /purge_range YYYY-MM-DD YYYY-MM-DD - Delete a date range\n",
        );
    }
    text.push_str("\nI only store plain text messages, and only in groups.");
    Reply::markdown(text)
}

pub fn denied() -> Reply {
    Reply::plain("🚫 This bot isn't available in this chat.")
}

pub fn group_only() -> Reply {
    Reply::plain("❌ This command only works in group chats.")
}

pub fn admin_only() -> Reply {
    Reply::plain("🚫 Only group administrators can do that.")
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

pub fn invalid_hours(raw: &str) -> Reply {
    Reply::plain(format!(
        "❌ '{raw}' is not a valid number of hours. Use a whole number, e.g. /summary 6."
    ))
}

pub fn window_clamped(max_hours: u32) -> Reply {
    Reply::plain(format!(
        "⚠️ I can only look back {max_hours} hours at most. Summarizing the last {max_hours} hours instead."
    ))
}

pub fn analyzing_hours(hours: u32) -> Reply {
    Reply::plain(format!(
        "📊 Analyzing messages from the last {}...",
        count_noun(u64::from(hours), "hour")
    ))
}

pub fn analyzing_since(time: &str) -> Reply {
    Reply::plain(format!("📊 Analyzing messages since {time}..."))
}

pub fn no_messages_hours(hours: u32) -> Reply {
    Reply::plain(format!(
        "😕 No messages in the last {}. I can only see messages sent while I'm in the group.",
        count_noun(u64::from(hours), "hour")
    ))
}

pub fn no_messages_since(time: &str) -> Reply {
    Reply::plain(format!(
        "😕 No messages since {time}. I can only see messages sent while I'm in the group."
    ))
}

pub fn summary_hours(hours: u32, analyzed: usize, body: &str) -> Reply {
    Reply::markdown(format!(
        "📝 *Summary of the last {}*\n_({} analyzed)_\n\n{body}",
        count_noun(u64::from(hours), "hour"),
        count_noun(analyzed as u64, "message"),
    ))
}

pub fn summary_since(time: &str, analyzed: usize, body: &str) -> Reply {
    Reply::markdown(format!(
        "📝 *Summary since {time}*\n_({} analyzed)_\n\n{body}",
        count_noun(analyzed as u64, "message"),
    ))
}

pub fn since_usage() -> Reply {
    Reply::plain("Usage: /since HH:MM\nExample: /since 09:30")
}

pub fn invalid_time(raw: &str) -> Reply {
    Reply::plain(format!(
        "❌ '{raw}' is not a valid time. Use HH:MM, e.g. /since 14:30."
    ))
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

pub fn stats_empty() -> Reply {
    Reply::plain("ℹ️ No messages stored for this group yet.")
}

pub fn stats(stats: &ChatStats, now: DateTime<Utc>) -> Reply {
    let mut text = format!(
        "📊 *Group archive*\n\n💬 Messages stored: {}\n",
        stats.total_messages
    );
    if let Some(earliest) = stats.earliest {
        text.push_str(&format!("📅 Saving for: {}\n", humanize_age(now, earliest)));
    }
    if !stats.top_senders.is_empty() {
        text.push_str("\n👥 *Most active:*\n");
        for (i, sender) in stats.top_senders.iter().enumerate() {
            text.push_str(&format!(
                "{}. {}: {}\n",
                i + 1,
                sender.display_name(),
                count_noun(sender.message_count, "message")
            ));
        }
    }
    Reply::markdown(text.trim_end().to_string())
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub fn game_usage() -> Reply {
    Reply::plain("Usage: /game <name>\nExample: /game Brass: Birmingham")
}

pub fn game_searching(name: &str) -> Reply {
    Reply::plain(format!("🔍 Looking up \"{name}\" in the catalog..."))
}

pub fn game_not_found(name: &str) -> Reply {
    Reply::plain(format!(
        "😕 Couldn't find \"{name}\" in the catalog. Check the spelling or try the full title."
    ))
}

pub fn game_details(entry: &GameEntry) -> Reply {
    let mut text = match entry.year {
        Some(year) => format!("🎲 *{}* ({year})\n\n", entry.name),
        None => format!("🎲 *{}*\n\n", entry.name),
    };

    if let Some(players) = player_line(entry) {
        text.push_str(&players);
        text.push('\n');
    }
    if let Some(minutes) = entry.playtime_minutes {
        text.push_str(&format!("⏱ Play time: {minutes} min\n"));
    }
    if let Some(weight) = entry.weight {
        text.push_str(&format!("⚖️ Weight: {weight:.2}/5\n"));
    }
    if let Some(rank) = entry.rank {
        text.push_str(&format!("🏆 Rank: #{rank}\n"));
    }
    if !entry.mechanics.is_empty() {
        text.push_str(&format!("⚙️ Mechanics: {}\n", entry.mechanics.join(", ")));
    }
    if !entry.summary.is_empty() {
        text.push_str(&format!("\n{}\n", entry.summary));
    }
    text.push_str(&format!("\n🔗 {}", entry.url));
    Reply::markdown(text)
}

fn player_line(entry: &GameEntry) -> Option<String> {
    let range = match (entry.min_players, entry.max_players) {
        (Some(min), Some(max)) if min == max => format!("{min}"),
        (Some(min), Some(max)) => format!("{min}-{max}"),
        (Some(min), None) => format!("{min}+"),
        (None, Some(max)) => format!("up to {max}"),
        (None, None) => return None,
    };
    let mut line = format!("👥 Players: {range}");
    if !entry.best_player_counts.is_empty() {
        line.push_str(&format!(" (best: {})", entry.best_player_counts.join(", ")));
    }
    Some(line)
}

// ---------------------------------------------------------------------------
// Purges
// ---------------------------------------------------------------------------

pub fn purge_all_done(deleted: u64) -> Reply {
    Reply::plain(format!(
        "🗑 Deleted {} from this group's archive.",
        count_noun(deleted, "stored message")
    ))
}

pub fn purge_none() -> Reply {
    Reply::plain("ℹ️ There are no stored messages to delete.")
}

pub fn purge_range_usage() -> Reply {
    Reply::plain(
        "Usage: /purge_range YYYY-MM-DD YYYY-MM-DD\nExample: /purge_range 2026-01-01 2026-01-31",
    )
}

pub fn purge_range_order() -> Reply {
    Reply::plain("⚠️ The start date must not be after the end date.")
}

pub fn purge_range_done(deleted: u64, from: &str, to: &str) -> Reply {
    Reply::plain(format!(
        "🗑 Deleted {} between {from} and {to}.",
        count_noun(deleted, "message")
    ))
}

pub fn purge_range_none(from: &str, to: &str) -> Reply {
    Reply::plain(format!("ℹ️ No stored messages between {from} and {to}."))
}

pub fn purge_failed() -> Reply {
    Reply::plain("⚠️ Couldn't delete messages right now. Please try again later.")
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

pub fn discussion_prompt(prompt: &DiscussionPrompt) -> Reply {
    Reply::markdown(format!("💬 *Table talk!*\n\n{}", prompt.text))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn count_noun(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn humanize_age(now: DateTime<Utc>, earliest: DateTime<Utc>) -> String {
    let age = now - earliest;
    let days = age.num_days();
    if days > 0 {
        count_noun(days as u64, "day")
    } else {
        count_noun(age.num_hours().max(0) as u64, "hour")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
