//! One-shot catalog lookup command.
//!
//! Runs the same pipeline as the `/game` chat command (cache, catalog
//! search, description compression) and prints the result to the
//! terminal. Useful for checking catalog behavior without a Telegram
//! round-trip.

use anyhow::Result;
use console::style;

use tabletalk_types::catalog::GameEntry;

use crate::state::AppState;

/// Look up one game by name and print its card.
pub async fn lookup(state: &AppState, name: &str, json: bool) -> Result<()> {
    let provider = state.llm_provider()?;
    let catalog = state.catalog_service(provider);

    let entry = catalog.lookup(name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let Some(entry) = entry else {
        println!();
        println!(
            "  {} No catalog match for '{}'.",
            style("✗").red(),
            style(name).cyan()
        );
        println!();
        return Ok(());
    };

    print_card(&entry);
    Ok(())
}

fn print_card(entry: &GameEntry) {
    println!();
    match entry.year {
        Some(year) => println!(
            "  {} {}",
            style(&entry.name).cyan().bold(),
            style(format!("({year})")).dim()
        ),
        None => println!("  {}", style(&entry.name).cyan().bold()),
    }
    if !entry.summary.is_empty() {
        println!("  {}", style(&entry.summary).dim());
    }
    println!();

    println!("  {}", style("── Details ──").dim());
    match (entry.min_players, entry.max_players) {
        (Some(min), Some(max)) if min == max => {
            println!("  {}  {}", style("Players:").bold(), min)
        }
        (Some(min), Some(max)) => println!("  {}  {min}-{max}", style("Players:").bold()),
        _ => {}
    }
    if !entry.best_player_counts.is_empty() {
        println!(
            "  {}     {}",
            style("Best:").bold(),
            entry.best_player_counts.join(", ")
        );
    }
    if let Some(minutes) = entry.playtime_minutes {
        println!("  {}  {minutes} min", style("Playtime:").bold());
    }
    if let Some(weight) = entry.weight {
        println!("  {}   {weight:.2} / 5", style("Weight:").bold());
    }
    if let Some(rank) = entry.rank {
        println!("  {}     #{rank}", style("Rank:").bold());
    }
    if !entry.mechanics.is_empty() {
        println!(
            "  {} {}",
            style("Mechanics:").bold(),
            entry.mechanics.join(", ")
        );
    }
    println!();
    println!("  {}", style(&entry.url).dim());
    println!();
}
