//! Merge engine for instructed PRs
//!
//! Three-part pattern:
//! 1. Plan - decide whether and how to merge (pure, testable)
//! 2. Execute - handle one PR against the platform API (effectful)
//! 3. Run - fetch all open PRs and execute them in order

mod execute;
mod plan;
mod run;

pub use execute::{ExecuteOptions, execute_merge, process_pull_request};
pub use plan::{
    MERGE_INSTRUCTION, MergeDecision, build_merge_request, commit_title, decide,
    has_merge_instruction, is_merge_instruction,
};
pub use run::{RunSummary, fetch_open_pull_requests, pluralize_pull_requests, run_once};
