//! `autopilot` - merge GitHub pull requests that ask for it

mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pr_autopilot::config::{Config, MAX_INTERVAL_MINUTES, Overrides};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Merge GitHub pull requests that carry a MERGE comment
#[derive(Debug, Parser)]
#[command(name = "autopilot", version)]
struct Cli {
    /// Repository owner (overrides REPO_OWNER)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Minutes between runs (at most one week)
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_MINUTES)
    )]
    interval_minutes: Option<u64>,

    /// Decide what would be merged without merging or deleting anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll on a schedule until interrupted (default)
    Run,
    /// Run a single pass and exit
    Once,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let overrides = Overrides {
        owner: cli.owner,
        interval_minutes: cli.interval_minutes,
        dry_run: cli.dry_run,
        config_path: cli.config,
    };
    let config = Config::load(&overrides).context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cli::run_scheduled(config).await?,
        Commands::Once => cli::run_once_command(config).await?,
    }

    Ok(())
}
