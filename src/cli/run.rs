//! Run commands - scheduled polling and one-shot runs

use crate::cli::CliProgress;
use crate::cli::style::{Stylize, check};
use anstream::println;
use pr_autopilot::config::Config;
use pr_autopilot::error::{Error, Result};
use pr_autopilot::merge::{ExecuteOptions, RunSummary, run_once};
use pr_autopilot::platform::{GitHubService, PlatformService};
use pr_autopilot::progress::ProgressCallback;
use pr_autopilot::scheduler::Scheduler;
use pr_autopilot::types::Repository;
use std::sync::Arc;
use tracing::{error, info};

/// Print the startup banner listing the schedule and repositories
fn print_banner(config: &Config, repos: &[Repository], scheduled: bool) {
    let minutes = config.interval_minutes();
    let every = match (scheduled, minutes) {
        (false, _) => "once".to_string(),
        (true, 1) => "every minute".to_string(),
        (true, _) => format!("every {minutes} minutes"),
    };

    println!("{}", "Starting build automation to:".emphasis());
    println!("- Automatically merge pull requests ({every})");
    if config.dry_run {
        println!("{}", "- Dry run: nothing will be merged or deleted".warn());
    }
    println!();
    println!("{}", "Operating on the following repositories:".emphasis());
    if repos.is_empty() {
        println!("{}", "  (none configured - set REPO_LIST)".muted());
    }
    for repo in repos {
        println!("- {}", repo.name.accent());
    }
}

/// Print a one-line summary after a run
fn print_summary(summary: &RunSummary) {
    println!(
        "{} Run complete: {} merged, {} not ready, {} failed",
        check(),
        summary.merged_count(),
        summary.not_ready_count(),
        summary.failed_count()
    );
}

/// Run one pass and report its result; errors end the run, never the process
async fn run_and_report(
    repos: &[Repository],
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    options: ExecuteOptions,
) -> Result<RunSummary> {
    match run_once(repos, platform, progress, options).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(summary)
        }
        Err(e) => {
            error!(error = %e, "run failed");
            progress.on_error(&format!("Run failed: {e}")).await;
            Err(e)
        }
    }
}

/// Poll forever on the configured interval until Ctrl-C
pub async fn run_scheduled(config: Config) -> Result<()> {
    let repos = config.repositories();
    print_banner(&config, &repos, true);

    let platform: Arc<dyn PlatformService> = Arc::new(GitHubService::new(
        &config.token,
        config.api_url.as_deref(),
    )?);
    let repos = Arc::new(repos);
    let options = ExecuteOptions {
        dry_run: config.dry_run,
    };

    let scheduler = Scheduler::new(config.interval);
    info!(next = %scheduler.next_tick(), "first run scheduled");

    let handle = scheduler.start(move || {
        let platform = Arc::clone(&platform);
        let repos = Arc::clone(&repos);
        async move {
            // Failures are already logged; the next tick starts fresh
            let _ = run_and_report(&repos, platform.as_ref(), &CliProgress, options).await;
        }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| Error::Internal(format!("failed to listen for Ctrl-C: {e}")))?;

    println!();
    println!("{}", "Stopping; waiting for any in-flight run...".muted());
    handle.shutdown().await;
    Ok(())
}

/// Run a single pass and exit
pub async fn run_once_command(config: Config) -> Result<()> {
    let repos = config.repositories();
    print_banner(&config, &repos, false);
    println!();

    let platform = GitHubService::new(&config.token, config.api_url.as_deref())?;
    let options = ExecuteOptions {
        dry_run: config.dry_run,
    };

    run_and_report(&repos, &platform, &CliProgress, options)
        .await
        .map(|_| ())
}
