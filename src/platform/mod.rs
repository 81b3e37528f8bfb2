//! Platform services for GitHub
//!
//! Provides the narrow set of pull request operations the merge workflow
//! needs, behind a trait so the workflow can run against a fake in tests.

mod github;

pub use github::{DEFAULT_API_URL, GitHubService};

use crate::error::Result;
use crate::types::{
    MergeRequest, MergeResult, PrComment, PullRequest, PullRequestDetails, Repository,
};
use async_trait::async_trait;

/// Platform service trait for PR operations
///
/// Methods that act on a single pull request take the `owner/name` of the
/// repository holding the head branch, which is where GitHub routes
/// comment, detail, merge and ref calls for that PR.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List all open PRs in a repository
    async fn list_open_prs(&self, repo: &Repository) -> Result<Vec<PullRequest>>;

    /// List issue comments on a PR
    async fn list_pr_comments(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> Result<Vec<PrComment>>;

    /// Get live merge status for a PR
    async fn get_pr_details(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> Result<PullRequestDetails>;

    /// Merge a PR
    ///
    /// A refusal from GitHub (conflicts, head moved, branch protection) is
    /// reported as `MergeResult { merged: false, .. }`, not as an error.
    async fn merge_pr(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        request: &MergeRequest,
    ) -> Result<MergeResult>;

    /// Delete a branch ref
    async fn delete_branch(&self, repo_full_name: &str, branch: &str) -> Result<()>;
}
