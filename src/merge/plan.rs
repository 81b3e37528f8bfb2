//! Merge planning - pure functions for deciding whether and how to merge
//!
//! No I/O happens here - all data is passed in, making it easy to unit test.

use crate::types::{
    MergeMethod, MergeRequest, MergeableState, PrComment, PullRequest, PullRequestDetails,
};

/// Comment body (after trimming, case-insensitive) that asks for a merge
pub const MERGE_INSTRUCTION: &str = "MERGE";

/// Check whether a single comment body is a merge instruction
///
/// The whole body must be the instruction; surrounding whitespace and case
/// are ignored, anything else disqualifies it.
pub fn is_merge_instruction(body: &str) -> bool {
    body.trim().to_uppercase() == MERGE_INSTRUCTION
}

/// Check whether any comment on a PR is a merge instruction
pub fn has_merge_instruction(comments: &[PrComment]) -> bool {
    comments.iter().any(|c| is_merge_instruction(&c.body))
}

/// What to do with a PR that carries a merge instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// Merge with the given method
    Merge(MergeMethod),
    /// GitHub does not consider the PR ready yet
    NotReady,
}

impl MergeDecision {
    /// Selected merge method, if the PR is ready
    pub const fn method(self) -> Option<MergeMethod> {
        match self {
            Self::Merge(method) => Some(method),
            Self::NotReady => None,
        }
    }
}

/// Decide whether a PR can be merged right now (PURE)
///
/// A PR is ready iff its mergeable state is `clean` and it is either
/// mergeable or rebaseable. `clean` is required even when the PR is
/// rebaseable. Rebase is preferred whenever it is available.
pub fn decide(details: &PullRequestDetails) -> MergeDecision {
    let mergeable = details.mergeable.unwrap_or(false);
    let rebaseable = details.rebaseable.unwrap_or(false);

    if details.mergeable_state != MergeableState::Clean || !(mergeable || rebaseable) {
        return MergeDecision::NotReady;
    }

    if rebaseable {
        MergeDecision::Merge(MergeMethod::Rebase)
    } else {
        MergeDecision::Merge(MergeMethod::Merge)
    }
}

/// Commit title used for the merge: `Merge pull request #N from repo/branch`
pub fn commit_title(pr: &PullRequest) -> String {
    format!(
        "Merge pull request #{} from {}",
        pr.number,
        pr.head.display_branch()
    )
}

/// Build the merge request body for a PR
///
/// The merge is pinned to the head SHA seen when the PR was listed, so
/// GitHub rejects it if the branch moved in the meantime.
pub fn build_merge_request(pr: &PullRequest, method: MergeMethod) -> MergeRequest {
    MergeRequest {
        method,
        sha: pr.head.sha.clone(),
        commit_title: commit_title(pr),
    }
}
