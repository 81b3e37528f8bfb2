//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use pr_autopilot::error::{Error, Result};
use pr_autopilot::platform::PlatformService;
use pr_autopilot::types::{
    MergeRequest, MergeResult, MergeableState, PrComment, PullRequest, PullRequestDetails,
    Repository,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// One recorded platform call, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListOpenPrs(String),
    ListComments(String, u64),
    GetDetails(String, u64),
    Merge(String, u64, MergeRequest),
    DeleteBranch(String, String),
}

/// Simple mock platform service for testing
///
/// Features:
/// - Configurable responses per repository / PR
/// - Call tracking for verification (single ordered log)
/// - Error injection for failure path testing
#[derive(Default)]
pub struct MockPlatformService {
    open_prs: Mutex<HashMap<String, Vec<PullRequest>>>,
    comments: Mutex<HashMap<u64, Vec<PrComment>>>,
    details: Mutex<HashMap<u64, PullRequestDetails>>,
    merge_results: Mutex<HashMap<u64, MergeResult>>,
    calls: Mutex<Vec<Call>>,
    // Holds every list call until this many are waiting
    list_barrier: Mutex<Option<Arc<Barrier>>>,
    // Error injection
    error_on_list_prs: Mutex<HashMap<String, String>>,
    error_on_comments: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_delete: Mutex<Option<String>>,
}

impl MockPlatformService {
    pub fn new() -> Self {
        Self::default()
    }

    // === Response setup ===

    /// Set the open PRs returned for a repository (`owner/name`)
    pub fn set_open_prs(&self, repo_full_name: &str, prs: Vec<PullRequest>) {
        self.open_prs
            .lock()
            .unwrap()
            .insert(repo_full_name.to_string(), prs);
    }

    /// Set the comments on a PR
    pub fn set_comments(&self, pr_number: u64, bodies: &[&str]) {
        let comments = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| PrComment {
                id: i as u64 + 1,
                body: (*body).to_string(),
            })
            .collect();
        self.comments.lock().unwrap().insert(pr_number, comments);
    }

    /// Set the detail response for a PR
    pub fn set_details(&self, details: PullRequestDetails) {
        self.details
            .lock()
            .unwrap()
            .insert(details.number, details);
    }

    /// Set the merge response for a PR
    pub fn set_merge_result(&self, pr_number: u64, merged: bool, message: Option<&str>) {
        self.merge_results.lock().unwrap().insert(
            pr_number,
            MergeResult {
                merged,
                message: message.map(String::from),
            },
        );
    }

    /// Helper: PR with a MERGE comment, clean state and a successful merge
    pub fn setup_ready_pr(&self, pr: &PullRequest, rebaseable: bool) {
        self.set_comments(pr.number, &["MERGE"]);
        self.set_details(details(
            pr.number,
            MergeableState::Clean,
            Some(true),
            Some(rebaseable),
        ));
        self.set_merge_result(pr.number, true, Some("Pull Request successfully merged"));
    }

    /// Make each `list_open_prs` call wait until `concurrent` of them are
    /// in flight at once
    pub fn require_concurrent_lists(&self, concurrent: usize) {
        *self.list_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(concurrent)));
    }

    // === Error injection methods ===

    /// Make `list_open_prs` fail for one repository
    pub fn fail_list_prs(&self, repo_full_name: &str, msg: &str) {
        self.error_on_list_prs
            .lock()
            .unwrap()
            .insert(repo_full_name.to_string(), msg.to_string());
    }

    /// Make `list_pr_comments` fail
    pub fn fail_comments(&self, msg: &str) {
        *self.error_on_comments.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` fail at the transport level
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `delete_branch` fail
    pub fn fail_delete(&self, msg: &str) {
        *self.error_on_delete.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<(u64, MergeRequest)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Merge(_, n, req) => Some((n, req)),
                _ => None,
            })
            .collect()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DeleteBranch(_, branch) => Some(branch),
                _ => None,
            })
            .collect()
    }

    pub fn details_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::GetDetails(..)))
            .count()
    }

    /// Assert that `merge_pr` was NOT called for a specific PR
    pub fn assert_merge_not_called(&self, pr_number: u64) {
        let calls = self.merge_calls();
        assert!(
            !calls.iter().any(|(n, _)| *n == pr_number),
            "Expected merge_pr({pr_number}) NOT to be called but it was: {calls:?}"
        );
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_open_prs(&self, repo: &Repository) -> Result<Vec<PullRequest>> {
        let full_name = repo.full_name();
        self.record(Call::ListOpenPrs(full_name.clone()));

        let barrier = self.list_barrier.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        if let Some(msg) = self.error_on_list_prs.lock().unwrap().get(&full_name) {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self
            .open_prs
            .lock()
            .unwrap()
            .get(&full_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_pr_comments(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> Result<Vec<PrComment>> {
        self.record(Call::ListComments(repo_full_name.to_string(), pr_number));

        if let Some(msg) = self.error_on_comments.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_pr_details(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> Result<PullRequestDetails> {
        self.record(Call::GetDetails(repo_full_name.to_string(), pr_number));

        self.details
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| {
                Error::Platform(format!(
                    "get_pr_details: no response configured for PR #{pr_number}"
                ))
            })
    }

    async fn merge_pr(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        request: &MergeRequest,
    ) -> Result<MergeResult> {
        self.record(Call::Merge(
            repo_full_name.to_string(),
            pr_number,
            request.clone(),
        ));

        if let Some(msg) = self.error_on_merge.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        self.merge_results
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| {
                Error::Platform(format!(
                    "merge_pr: no response configured for PR #{pr_number}"
                ))
            })
    }

    async fn delete_branch(&self, repo_full_name: &str, branch: &str) -> Result<()> {
        self.record(Call::DeleteBranch(
            repo_full_name.to_string(),
            branch.to_string(),
        ));

        if let Some(msg) = self.error_on_delete.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(())
    }
}

/// Build PR details for tests
pub fn details(
    number: u64,
    state: MergeableState,
    mergeable: Option<bool>,
    rebaseable: Option<bool>,
) -> PullRequestDetails {
    PullRequestDetails {
        number,
        mergeable,
        rebaseable,
        mergeable_state: state,
        head_sha: format!("sha-{number}"),
    }
}
