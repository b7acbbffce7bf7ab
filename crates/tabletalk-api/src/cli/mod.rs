//! CLI command definitions and dispatch for the `ttalk` binary.
//!
//! Uses clap derive macros for argument parsing. Most of the time the
//! binary runs as `ttalk run`; the other commands are operator tools.

pub mod lookup;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Group-chat summarizer bot for board-game groups.
#[derive(Parser)]
#[command(name = "ttalk", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print machine-readable JSON in place of the styled output.
    #[arg(long, global = true)]
    pub json: bool,

    /// Silence everything but errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// More log detail (-v for info/debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the bot: Telegram polling, prompt scheduler, keep-alive server.
    Run,

    /// Show archive statistics per chat.
    Status,

    /// Look up a board game in the catalog without going through Telegram.
    Lookup {
        /// Game name to search for (multiple words allowed).
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Emit a completion script for your shell.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}
