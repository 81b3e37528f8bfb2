//! GitHub token lookup

use crate::error::{Error, Result};
use tracing::debug;

/// Environment variable holding the personal access token
pub const TOKEN_ENV_VAR: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";

/// Resolved GitHub credentials
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// Personal access token
    pub token: String,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Read the token from the process environment
pub fn get_github_auth() -> Result<GitHubAuthConfig> {
    github_auth_from(|key| std::env::var(key).ok())
}

/// Read the token through an arbitrary variable lookup
///
/// Blank values are treated as missing.
pub fn github_auth_from(lookup: impl Fn(&str) -> Option<String>) -> Result<GitHubAuthConfig> {
    let token = lookup(TOKEN_ENV_VAR)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Auth(format!("{TOKEN_ENV_VAR} is not set")))?;

    debug!("using GitHub token from {TOKEN_ENV_VAR}");
    Ok(GitHubAuthConfig { token })
}
