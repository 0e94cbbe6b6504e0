//! Application configuration and environment variable parsing.
//!
//! This module handles loading configuration settings from the environment (e.g., .env file).
//! It defines the `AppConfig` struct, which names the repository to report on, the
//! credentials used against the GitHub API and the default commit lookback window.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_GITHUB_API_BASE_URL: &str = "https://api.github.com";

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl RepoId {
    /// Extracts the owner and repository name from a url of the form
    /// `scheme://host/{owner}/{repo}[/...]`.
    ///
    /// Owner and repo are the first two path segments; anything after them is ignored.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRepoUrl(url.to_string());

        let (_, rest) = url.trim().split_once("://").ok_or_else(invalid)?;
        let rest = rest.split(|c: char| c == '?' || c == '#').next().unwrap_or("");

        // The first segment is the host.
        let mut segments = rest.split('/').skip(1);
        match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => Ok(RepoId {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// How requests to the GitHub API authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP Basic with a username and a personal access token.
    Basic { username: String, token: String },
    /// A personal access token without a username.
    Token(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("token", &"***")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Url of the repository to report on, e.g. "https://github.com/rust-lang/rust".
    pub repo_url: Option<String>,

    /// GitHub username used for Basic authentication.
    pub github_username: Option<String>,

    /// GitHub personal access token.
    pub github_token: Option<String>,

    /// Base url of the GitHub REST API.
    #[serde(default = "default_api_base_url")]
    pub github_api_base_url: String,

    /// Number of past days (besides today) the commit report covers.
    #[serde(default = "default_commit_days_before")]
    pub commit_days_before: i64,

    /// Refuse to run anonymously when set.
    #[serde(default)]
    pub require_credentials: bool,
}

fn default_api_base_url() -> String {
    DEFAULT_GITHUB_API_BASE_URL.to_string()
}

fn default_commit_days_before() -> i64 {
    365
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::from_env()?)
    }

    pub fn repo_id(&self) -> Result<RepoId, ConfigError> {
        let url = self
            .repo_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingRepoUrl)?;
        RepoId::from_url(url)
    }

    /// Resolves the credentials to authenticate with, if any.
    ///
    /// A username without a token cannot authenticate and is ignored.
    pub fn credentials(&self) -> Result<Option<Credentials>, ConfigError> {
        let username = non_blank(&self.github_username);
        let token = non_blank(&self.github_token);

        let credentials = match (username, token) {
            (Some(username), Some(token)) => Some(Credentials::Basic { username, token }),
            (None, Some(token)) => Some(Credentials::Token(token)),
            (Some(username), None) => {
                tracing::warn!(%username, "GITHUB_USERNAME set without GITHUB_TOKEN, ignoring");
                None
            }
            (None, None) => None,
        };

        match credentials {
            Some(Credentials::Basic { .. }) => Ok(credentials),
            _ if self.require_credentials => Err(ConfigError::MissingCredentials),
            _ => Ok(credentials),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
