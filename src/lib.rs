//! pr-autopilot: merge GitHub pull requests on request
//!
//! Polls a list of repositories on a fixed schedule, finds open pull
//! requests with a `MERGE` comment, and merges the ones GitHub reports as
//! clean, deleting their head branch afterwards.

pub mod auth;
pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod progress;
pub mod scheduler;
pub mod types;
