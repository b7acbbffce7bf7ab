//! Entry point for `ttalk`, the TableTalk bot binary.
//!
//! `ttalk run` is the long-lived mode (Telegram polling plus scheduler and
//! keep-alive server); `status`, `lookup`, and `completions` are one-shot
//! operator tools sharing the same config and database.

mod cli;
mod http;
mod state;
mod telegram;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

/// RUST_LOG takes precedence over this verbosity-derived default.
fn log_filter(cli: &Cli) -> &'static str {
    match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,tabletalk_core=debug,tabletalk_infra=debug,tabletalk_api=debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(error) = tabletalk_observe::init_tracing(log_filter(&cli), cli.otel) {
        eprintln!("Warning: tracing init failed: {error}");
    }

    // Completions need no config or database.
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "ttalk", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Run => cli::run::run(&state).await?,
        Commands::Status => cli::status::status(&state, cli.json).await?,
        Commands::Lookup { name } => cli::lookup::lookup(&state, &name.join(" "), cli.json).await?,
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    tabletalk_observe::shutdown_tracing();
    Ok(())
}
