//! Error types for pr-autopilot

use thiserror::Error;

/// Errors that can occur while polling and merging pull requests
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or unusable credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// GitHub API returned an error response
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic platform failure (used by non-HTTP platform implementations)
    #[error("platform error: {0}")]
    Platform(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
