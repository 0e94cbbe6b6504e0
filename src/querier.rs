//! Service layer for fetching repository activity and computing reports.
//!
//! `RepoStats` is the main entry point. It is bound to one repository and one
//! transport, and each call fetches what it needs from scratch:
//! 1. Raw records are fetched page by page (or in one request for statistics).
//! 2. The records are normalized and aggregated into a report.
//!
//! No state is kept between calls.

use crate::config::{AppConfig, RepoId};
use crate::error::Result;
use crate::fetcher;
use crate::github::{GitHubClient, Transport};
use crate::metrics::{self, CommitMetricSummary};
use crate::types::{
    Branch, CodeFrequencyPoint, CommitActivityPoint, CommitRecord, ContributorActivity, Issue,
    PullRequest,
};
use crate::weekly::{self, WeeklyMetricReport};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct BranchSummary {
    pub num_branches: usize,
    pub num_protected: usize,
}

pub struct RepoStats {
    repo: RepoId,
    transport: Box<dyn Transport>,
}

impl RepoStats {
    /// Initializes a new RepoStats for the repository named in `config`.
    ///
    /// This sets up the GitHub client with the configured credentials.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let repo = config.repo_id()?;
        let client = GitHubClient::new(&config.github_api_base_url, config.credentials()?)?;
        tracing::debug!(
            repo = %repo,
            base_url = %config.github_api_base_url,
            "Created GitHub client"
        );

        Ok(Self::with_transport(repo, Box::new(client)))
    }

    /// Uses `transport` instead of the GitHub API client.
    pub fn with_transport(repo: RepoId, transport: Box<dyn Transport>) -> Self {
        Self { repo, transport }
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn fetch_branches(&self) -> Result<Vec<Branch>> {
        Ok(fetcher::fetch_branches(&*self.transport, &self.repo)?)
    }

    /// Fetches the commits of the last `days_before` days and today.
    pub fn fetch_commits(&self, days_before: i64) -> Result<Vec<CommitRecord>> {
        self.fetch_commits_at(days_before, Utc::now())
    }

    /// Like [`RepoStats::fetch_commits`], with the window anchored at `now`.
    ///
    /// Fails with [`crate::ConfigError::InvalidLookback`] before any request when the
    /// window starts outside the supported calendar range.
    pub fn fetch_commits_at(
        &self,
        days_before: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<CommitRecord>> {
        fetcher::fetch_commits(&*self.transport, &self.repo, days_before, now)
    }

    pub fn fetch_pulls(&self) -> Result<Vec<PullRequest>> {
        Ok(fetcher::fetch_pulls(&*self.transport, &self.repo)?)
    }

    pub fn fetch_issues(&self) -> Result<Vec<Issue>> {
        Ok(fetcher::fetch_issues(&*self.transport, &self.repo)?)
    }

    pub fn fetch_weekly_additions_deletions(&self) -> Result<Vec<CodeFrequencyPoint>> {
        Ok(fetcher::fetch_code_frequency(&*self.transport, &self.repo)?)
    }

    pub fn fetch_weekly_commit_activity(&self) -> Result<Vec<CommitActivityPoint>> {
        Ok(fetcher::fetch_commit_activity(&*self.transport, &self.repo)?)
    }

    pub fn fetch_contributor_activity(&self) -> Result<Vec<ContributorActivity>> {
        Ok(fetcher::fetch_contributor_activity(&*self.transport, &self.repo)?)
    }

    /// Counts commits and contributors over the last `days_before` days and today.
    pub fn commit_stats(&self, days_before: i64) -> Result<CommitMetricSummary> {
        self.commit_stats_at(days_before, Utc::now())
    }

    pub fn commit_stats_at(
        &self,
        days_before: i64,
        now: DateTime<Utc>,
    ) -> Result<CommitMetricSummary> {
        let commits = self.fetch_commits_at(days_before, now)?;
        let summary = metrics::summarize_commits(&commits, days_before);
        tracing::info!(
            repo = %self.repo,
            num_commits = summary.num_commits,
            num_contributors = summary.num_contributors,
            "Computed commit stats"
        );
        Ok(summary)
    }

    /// Compares the most recent week of activity with trailing means.
    pub fn metric_stats(&self) -> Result<WeeklyMetricReport> {
        let code_frequency = self.fetch_weekly_additions_deletions()?;
        let commit_activity = self.fetch_weekly_commit_activity()?;
        let contributors = self.fetch_contributor_activity()?;

        let report =
            weekly::build_weekly_report(&commit_activity, &code_frequency, &contributors)?;
        tracing::info!(repo = %self.repo, week = %report.week, "Computed weekly metric stats");
        Ok(report)
    }

    pub fn branch_stats(&self) -> Result<BranchSummary> {
        let branches = self.fetch_branches()?;
        Ok(BranchSummary {
            num_branches: branches.len(),
            num_protected: branches.iter().filter(|b| b.protected).count(),
        })
    }
}
