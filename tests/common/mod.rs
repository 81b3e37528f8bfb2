//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{Call, MockPlatformService, details};

use async_trait::async_trait;
use pr_autopilot::progress::ProgressCallback;
use pr_autopilot::types::{PrHead, PullRequest};
use std::sync::Mutex;

/// Owner used by fixtures
pub const OWNER: &str = "clarifyhealth";

/// Build an open PR in `OWNER/repo`
pub fn make_pr(repo: &str, number: u64, author: &str, branch: &str) -> PullRequest {
    PullRequest {
        number,
        author: author.to_string(),
        head: PrHead {
            ref_name: branch.to_string(),
            sha: format!("sha-{number}"),
            repo_name: repo.to_string(),
            repo_full_name: format!("{OWNER}/{repo}"),
        },
    }
}

/// Severity of a captured progress line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// Progress sink that records every line
#[derive(Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, m)| m).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }

    fn push(&self, level: Level, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_message(&self, message: &str) {
        self.push(Level::Info, message);
    }

    async fn on_success(&self, message: &str) {
        self.push(Level::Success, message);
    }

    async fn on_warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }

    async fn on_error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
