//! Core types for pr-autopilot

use serde::{Deserialize, Serialize};

/// A repository being polled for pull requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl Repository {
    /// Create a repository reference
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Head side of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrHead {
    /// Head branch name
    pub ref_name: String,
    /// Head commit SHA
    pub sha: String,
    /// Name of the repository the head branch lives in
    pub repo_name: String,
    /// `owner/name` of the repository the head branch lives in
    pub repo_full_name: String,
}

impl PrHead {
    /// `<repo-name>/<branch>`, as shown in log lines and commit titles
    pub fn display_branch(&self) -> String {
        format!("{}/{}", self.repo_name, self.ref_name)
    }
}

/// An open pull request, as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Login of the PR author
    pub author: String,
    /// Head branch information
    pub head: PrHead,
}

/// A comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Comment body text
    pub body: String,
}

/// GitHub's computed merge status for a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeableState {
    /// No conflicts, all requirements satisfied
    Clean,
    /// Merge conflicts
    Dirty,
    /// GitHub has not finished computing the state
    Unknown,
    /// Blocked by branch protection
    Blocked,
    /// Head branch is behind the base branch
    Behind,
    /// Mergeable, but with failing non-required checks
    Unstable,
    /// Mergeable, with passing pre-receive hooks
    HasHooks,
    /// PR is a draft
    Draft,
    /// Any value GitHub adds in the future
    Other(String),
}

impl MergeableState {
    /// Parse GitHub's lowercase `mergeable_state` string
    pub fn parse(value: &str) -> Self {
        match value {
            "clean" => Self::Clean,
            "dirty" => Self::Dirty,
            "unknown" => Self::Unknown,
            "blocked" => Self::Blocked,
            "behind" => Self::Behind,
            "unstable" => Self::Unstable,
            "has_hooks" => Self::HasHooks,
            "draft" => Self::Draft,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Dirty => write!(f, "dirty"),
            Self::Unknown => write!(f, "unknown"),
            Self::Blocked => write!(f, "blocked"),
            Self::Behind => write!(f, "behind"),
            Self::Unstable => write!(f, "unstable"),
            Self::HasHooks => write!(f, "has_hooks"),
            Self::Draft => write!(f, "draft"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Live merge status of a single pull request
///
/// `mergeable` and `rebaseable` are `None` while GitHub is still computing
/// them; callers treat that the same as `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDetails {
    /// PR number
    pub number: u64,
    /// Whether the PR can be merged with a merge commit
    pub mergeable: Option<bool>,
    /// Whether the PR can be rebased onto its base
    pub rebaseable: Option<bool>,
    /// GitHub's computed merge state
    pub mergeable_state: MergeableState,
    /// Head commit SHA at the time of the fetch
    pub head_sha: String,
}

/// Merge strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// Body of a merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequest {
    /// Merge method to use
    #[serde(rename = "merge_method")]
    pub method: MergeMethod,
    /// Head SHA the merge is pinned to; GitHub rejects the merge if the branch moved
    pub sha: String,
    /// Title of the resulting commit
    pub commit_title: String,
}

/// Result of a merge operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// Message from the merge operation (especially on failure)
    #[serde(default)]
    pub message: Option<String>,
}

/// Terminal outcome of handling one pull request during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrOutcome {
    /// No MERGE instruction comment
    Ignored,
    /// Instruction present, but GitHub does not consider the PR ready
    SkippedNotReady,
    /// Dry run: the PR would have been merged with this method
    WouldMerge {
        /// Selected merge method
        method: MergeMethod,
    },
    /// Merged and head branch deleted
    Merged,
    /// Merged, but deleting the head branch failed
    BranchDeleteFailed {
        /// Error from the delete call
        message: String,
    },
    /// GitHub refused the merge
    MergeFailed {
        /// Reason reported by GitHub
        message: Option<String>,
    },
}

impl PrOutcome {
    /// Whether the pull request ended up merged
    pub const fn is_merged(&self) -> bool {
        matches!(self, Self::Merged | Self::BranchDeleteFailed { .. })
    }
}
