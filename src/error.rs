//! Error taxonomy for configuration, fetching and aggregation.

use thiserror::Error;

/// Boxed error produced by a [`crate::github::Transport`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("repository url is required (set REPO_URL)")]
    MissingRepoUrl,
    #[error("invalid repository url: {0}")]
    InvalidRepoUrl(String),
    #[error("commit lookback of {0} days is out of range")]
    InvalidLookback(i64),
    #[error("GitHub username and token are required")]
    MissingCredentials,
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("failed to build GitHub client: {0}")]
    HttpClient(#[source] BoxError),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: BoxError,
    },
    #[error("request to {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("{endpoint} is still being computed by GitHub, retry later")]
    Pending { endpoint: String },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// The request path the failure belongs to.
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Pending { endpoint }
            | FetchError::Decode { endpoint, .. } => endpoint,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("weekly alignment produced no rows")]
    NoAlignedRows,
    #[error(
        "trailing means need at least one week of history before the current week, \
         got {rows} row(s) in total"
    )]
    InsufficientHistory { rows: usize },
}
