pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod metrics;
pub mod paginator;
pub mod querier;
pub mod types;
pub mod weekly;

pub use config::{AppConfig, Credentials, RepoId};
pub use error::{AggregationError, ConfigError, Error, FetchError, Result};
pub use github::{GitHubClient, RawResponse, Transport};
pub use metrics::CommitMetricSummary;
pub use querier::{BranchSummary, RepoStats};
pub use weekly::WeeklyMetricReport;
