//! Merge execution - effectful operations
//!
//! This module contains the effectful code that handles one pull request:
//! it gathers comments and merge status through the platform API, applies
//! the pure decision from `plan`, and performs the merge and branch cleanup.

use crate::error::Result;
use crate::merge::plan::{MergeDecision, build_merge_request, decide, has_merge_instruction};
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::types::{MergeMethod, PrOutcome, PullRequest};
use tracing::{debug, warn};

/// Options for handling pull requests
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Decide but do not merge or delete anything
    pub dry_run: bool,
}

/// Handle a single pull request end to end (EFFECTFUL)
///
/// Errors from the comment, detail and merge calls propagate to the caller.
/// A failed branch deletion never does; it is reported as
/// [`PrOutcome::BranchDeleteFailed`].
pub async fn process_pull_request(
    pr: &PullRequest,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    options: ExecuteOptions,
) -> Result<PrOutcome> {
    let repo = &pr.head.repo_full_name;

    let comments = platform.list_pr_comments(repo, pr.number).await?;
    if !has_merge_instruction(&comments) {
        debug!(pr_number = pr.number, "no merge instruction");
        return Ok(PrOutcome::Ignored);
    }

    progress
        .on_message(&format!(
            "Processing pull request #{} by {} from {}.",
            pr.number,
            pr.author,
            pr.head.display_branch()
        ))
        .await;

    let details = platform.get_pr_details(repo, pr.number).await?;
    debug!(
        pr_number = details.number,
        head_sha = %details.head_sha,
        listed_sha = %pr.head.sha,
        head_moved = details.head_sha != pr.head.sha,
        "got merge status"
    );

    let method = match decide(&details) {
        MergeDecision::Merge(method) => method,
        MergeDecision::NotReady => {
            debug!(
                pr_number = pr.number,
                state = %details.mergeable_state,
                mergeable = ?details.mergeable,
                rebaseable = ?details.rebaseable,
                "not ready to merge"
            );
            progress
                .on_message(&format!(
                    "    #{} - Skipping pull request because it is not yet ready.",
                    pr.number
                ))
                .await;
            return Ok(PrOutcome::SkippedNotReady);
        }
    };

    if options.dry_run {
        progress
            .on_message(&format!(
                "    #{} - Would merge pull request with \"{method}\".",
                pr.number
            ))
            .await;
        return Ok(PrOutcome::WouldMerge { method });
    }

    execute_merge(pr, method, platform, progress).await
}

/// Merge a PR that was decided ready, then delete its head branch
pub async fn execute_merge(
    pr: &PullRequest,
    method: MergeMethod,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
) -> Result<PrOutcome> {
    let repo = &pr.head.repo_full_name;
    let branch = pr.head.display_branch();

    progress
        .on_message(&format!(
            "    #{} - Merging pull request with \"{method}\".",
            pr.number
        ))
        .await;

    let request = build_merge_request(pr, method);
    let result = platform.merge_pr(repo, pr.number, &request).await?;

    if !result.merged {
        progress
            .on_error(&format!(
                "    #{} - FAILED to merge pull request {} by {} from {branch}.",
                pr.number, pr.number, pr.author
            ))
            .await;
        progress
            .on_error(&format!(
                "    #{} - Reason: {}",
                pr.number,
                result.message.as_deref().unwrap_or("(no message)")
            ))
            .await;
        return Ok(PrOutcome::MergeFailed {
            message: result.message,
        });
    }

    progress
        .on_success(&format!(
            "    #{} - Successfully merged pull request.",
            pr.number
        ))
        .await;

    progress
        .on_message(&format!("    #{} - Deleting branch {branch}.", pr.number))
        .await;

    match platform.delete_branch(repo, &pr.head.ref_name).await {
        Ok(()) => {
            progress
                .on_success(&format!(
                    "    #{} - Successfully deleted branch {branch}.",
                    pr.number
                ))
                .await;
            Ok(PrOutcome::Merged)
        }
        Err(e) => {
            // Merge already happened; cleanup is best-effort
            warn!(pr_number = pr.number, error = %e, "branch deletion failed");
            progress
                .on_warning(&format!(
                    "    #{} - Failed to delete branch {branch} after merging pull request {} by {}.",
                    pr.number, pr.number, pr.author
                ))
                .await;
            Ok(PrOutcome::BranchDeleteFailed {
                message: e.to_string(),
            })
        }
    }
}
