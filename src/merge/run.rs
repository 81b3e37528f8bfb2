//! One polling run across all configured repositories

use crate::error::Result;
use crate::merge::execute::{ExecuteOptions, process_pull_request};
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::types::{PrOutcome, PullRequest, Repository};
use futures::future::try_join_all;
use tracing::{debug, info};

/// Outcome of a single run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of repositories polled
    pub repositories: usize,
    /// Outcome per PR, in processing order
    pub outcomes: Vec<(u64, PrOutcome)>,
}

impl RunSummary {
    /// Number of open PRs seen
    pub fn pull_requests(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of PRs merged during the run (including ones whose branch
    /// deletion failed)
    pub fn merged_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_merged()).count()
    }

    /// Number of PRs that carried an instruction but were not ready
    pub fn not_ready_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PrOutcome::SkippedNotReady))
            .count()
    }

    /// Number of PRs GitHub refused to merge
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PrOutcome::MergeFailed { .. }))
            .count()
    }

    /// Outcome for a PR number, if it was seen
    pub fn outcome_for(&self, pr_number: u64) -> Option<&PrOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| *n == pr_number)
            .map(|(_, o)| o)
    }
}

/// Fetch open PRs for every repository concurrently
///
/// Results are flattened in repository order. The first failing fetch
/// fails the whole call.
pub async fn fetch_open_pull_requests(
    repos: &[Repository],
    platform: &dyn PlatformService,
) -> Result<Vec<PullRequest>> {
    let per_repo = try_join_all(repos.iter().map(|repo| platform.list_open_prs(repo))).await?;
    Ok(per_repo.into_iter().flatten().collect())
}

/// Run one full poll-and-merge pass
///
/// PRs are handled one at a time. Any error other than a failed branch
/// deletion ends the run early.
pub async fn run_once(
    repos: &[Repository],
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    options: ExecuteOptions,
) -> Result<RunSummary> {
    debug!(repositories = repos.len(), "starting run");

    let pull_requests = fetch_open_pull_requests(repos, platform).await?;

    progress
        .on_message(&format!(
            "Found total of {}.",
            pluralize_pull_requests(pull_requests.len())
        ))
        .await;

    let mut summary = RunSummary {
        repositories: repos.len(),
        outcomes: Vec::with_capacity(pull_requests.len()),
    };

    for pr in &pull_requests {
        let outcome = process_pull_request(pr, platform, progress, options).await?;
        debug!(pr_number = pr.number, outcome = ?outcome, "processed PR");
        summary.outcomes.push((pr.number, outcome));
    }

    info!(
        pull_requests = summary.pull_requests(),
        merged = summary.merged_count(),
        not_ready = summary.not_ready_count(),
        failed = summary.failed_count(),
        "run complete"
    );
    Ok(summary)
}

/// `1 pull request`, `3 pull requests`
pub fn pluralize_pull_requests(count: usize) -> String {
    if count == 1 {
        "1 pull request".to_string()
    } else {
        format!("{count} pull requests")
    }
}
