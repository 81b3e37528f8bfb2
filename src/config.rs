//! Runtime configuration
//!
//! Values are resolved in order: CLI flag, environment, optional TOML file,
//! built-in default. The GitHub token only ever comes from the environment.

use crate::auth::github_auth_from;
use crate::error::{Error, Result};
use crate::types::Repository;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the `;`-separated repository list
pub const REPO_LIST_ENV_VAR: &str = "REPO_LIST";

/// Environment variable overriding the repository owner
pub const REPO_OWNER_ENV_VAR: &str = "REPO_OWNER";

/// Environment variable overriding the API base URL
pub const API_URL_ENV_VAR: &str = "GITHUB_API_URL";

/// Separator between entries of `REPO_LIST`
pub const REPO_LIST_DELIMITER: char = ';';

/// Owner namespace used when none is configured
pub const DEFAULT_OWNER: &str = "clarifyhealth";

/// Minutes between scheduled runs
pub const DEFAULT_INTERVAL_MINUTES: u64 = 2;

/// Longest accepted interval (one week)
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Directory name under the user config dir
const CONFIG_DIR: &str = "pr-autopilot";

/// Filename for the optional config file
const CONFIG_FILE: &str = "config.toml";

/// Split a delimited repository list into trimmed, non-blank names.
///
/// Order is preserved and duplicates are kept. `None` or an empty string
/// yields an empty list.
pub fn parse_repo_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| normalize_names(s.split(REPO_LIST_DELIMITER)))
        .unwrap_or_default()
}

fn normalize_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Contents of the optional `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Repository owner
    pub owner: Option<String>,
    /// Repository short names
    pub repos: Option<Vec<String>>,
    /// Minutes between runs
    pub interval_minutes: Option<u64>,
    /// API base URL
    pub api_url: Option<String>,
}

/// Default location of the config file, if a config dir exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load a config file from disk.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--owner`
    pub owner: Option<String>,
    /// `--interval-minutes`
    pub interval_minutes: Option<u64>,
    /// `--dry-run`
    pub dry_run: bool,
    /// `--config`
    pub config_path: Option<PathBuf>,
}

/// Fully resolved configuration
#[derive(Clone)]
pub struct Config {
    /// Owner namespace for every repository
    pub owner: String,
    /// Repository short names, in configured order
    pub repo_names: Vec<String>,
    /// GitHub personal access token
    pub token: String,
    /// API base URL (`None` for api.github.com)
    pub api_url: Option<String>,
    /// Time between scheduled runs
    pub interval: Duration,
    /// Decide but never merge or delete
    pub dry_run: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("owner", &self.owner)
            .field("repo_names", &self.repo_names)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("interval", &self.interval)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Config {
    /// Resolve configuration from the process environment and config file
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => load_file_config(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => load_file_config(&path)?,
                _ => FileConfig::default(),
            },
        };

        Self::resolve(overrides, file, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from explicit sources
    pub fn resolve(
        overrides: &Overrides,
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let auth = github_auth_from(&lookup)?;

        let env_nonblank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let owner = overrides
            .owner
            .clone()
            .or_else(|| env_nonblank(REPO_OWNER_ENV_VAR))
            .or(file.owner)
            .unwrap_or_else(|| DEFAULT_OWNER.to_string());

        let repo_names = match lookup(REPO_LIST_ENV_VAR) {
            Some(raw) => parse_repo_list(Some(&raw)),
            None => file
                .repos
                .as_ref()
                .map(|repos| normalize_names(repos.iter().map(String::as_str)))
                .unwrap_or_default(),
        };

        let interval_minutes = overrides
            .interval_minutes
            .or(file.interval_minutes)
            .unwrap_or(DEFAULT_INTERVAL_MINUTES);
        if !(1..=MAX_INTERVAL_MINUTES).contains(&interval_minutes) {
            return Err(Error::Config(format!(
                "interval must be between 1 and {MAX_INTERVAL_MINUTES} minutes, got {interval_minutes}"
            )));
        }

        let api_url = env_nonblank(API_URL_ENV_VAR).or(file.api_url);

        Ok(Self {
            owner,
            repo_names,
            token: auth.token,
            api_url,
            interval: Duration::from_secs(interval_minutes * 60),
            dry_run: overrides.dry_run,
        })
    }

    /// Repositories to poll, in configured order
    pub fn repositories(&self) -> Vec<Repository> {
        self.repo_names
            .iter()
            .map(|name| Repository::new(self.owner.clone(), name.clone()))
            .collect()
    }

    /// Interval expressed in whole minutes
    pub const fn interval_minutes(&self) -> u64 {
        self.interval.as_secs() / 60
    }
}
