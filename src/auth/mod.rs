//! Authentication for GitHub
//!
//! The token is read from the environment only.

mod github;

pub use github::{GitHubAuthConfig, TOKEN_ENV_VAR, get_github_auth, github_auth_from};
