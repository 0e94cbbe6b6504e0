//! Endpoint-specific fetchers.
//!
//! The four list endpoints go through the [`Paginator`]; the three `/stats/*` endpoints
//! are single requests. GitHub computes statistics lazily: a stats endpoint may answer
//! 202 (surfaced as [`FetchError::Pending`]) or an empty array until the numbers are ready.

use crate::config::RepoId;
use crate::error::{ConfigError, FetchError};
use crate::github::{get_checked, Transport};
use crate::paginator::{DateBoundary, Paginator};
use crate::types::{
    Branch, BranchWire, CodeFrequencyPoint, CommitActivityPoint, CommitRecord, CommitWire,
    ContributorActivity, Issue, IssueWire, PullRequest, PullWire,
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::de::DeserializeOwned;

/// Start of the UTC day `days_before` days before `now`. Negative values mean today.
///
/// Fails when the day falls outside the supported calendar range.
pub fn since_timestamp(
    days_before: i64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ConfigError> {
    let day = Duration::try_days(days_before.max(0))
        .and_then(|lookback| now.date_naive().checked_sub_signed(lookback))
        .ok_or(ConfigError::InvalidLookback(days_before))?;
    Ok(day.and_time(NaiveTime::MIN).and_utc())
}

pub fn fetch_branches(
    transport: &dyn Transport,
    repo: &RepoId,
) -> Result<Vec<Branch>, FetchError> {
    Paginator::new(transport, repo).walk("branches", None, |wire: BranchWire| wire.into())
}

/// Fetches the commits made since the start of the day `days_before` days before `now`.
pub fn fetch_commits(
    transport: &dyn Transport,
    repo: &RepoId,
    days_before: i64,
    now: DateTime<Utc>,
) -> crate::error::Result<Vec<CommitRecord>> {
    let boundary: DateBoundary<CommitRecord> = DateBoundary {
        since: since_timestamp(days_before, now)?,
        timestamp: |commit: &CommitRecord| commit.committed_at.with_timezone(&Utc),
    };
    let commits = Paginator::new(transport, repo)
        .walk("commits", Some(boundary), |wire: CommitWire| wire.into())?;
    Ok(commits)
}

pub fn fetch_pulls(
    transport: &dyn Transport,
    repo: &RepoId,
) -> Result<Vec<PullRequest>, FetchError> {
    Paginator::new(transport, repo).walk("pulls", None, |wire: PullWire| wire.into_record(repo))
}

pub fn fetch_issues(transport: &dyn Transport, repo: &RepoId) -> Result<Vec<Issue>, FetchError> {
    Paginator::new(transport, repo).walk("issues", None, |wire: IssueWire| wire.into_record(repo))
}

/// Weekly additions and deletions, oldest week first.
pub fn fetch_code_frequency(
    transport: &dyn Transport,
    repo: &RepoId,
) -> Result<Vec<CodeFrequencyPoint>, FetchError> {
    fetch_stats(transport, repo, "code_frequency")
}

/// Weekly commit counts for the last year, oldest week first.
pub fn fetch_commit_activity(
    transport: &dyn Transport,
    repo: &RepoId,
) -> Result<Vec<CommitActivityPoint>, FetchError> {
    fetch_stats(transport, repo, "commit_activity")
}

pub fn fetch_contributor_activity(
    transport: &dyn Transport,
    repo: &RepoId,
) -> Result<Vec<ContributorActivity>, FetchError> {
    fetch_stats(transport, repo, "contributors")
}

fn fetch_stats<T: DeserializeOwned>(
    transport: &dyn Transport,
    repo: &RepoId,
    stat: &str,
) -> Result<Vec<T>, FetchError> {
    let path = format!("/repos/{}/{}/stats/{}", repo.owner, repo.repo, stat);
    let response = get_checked(transport, &path)?;

    // 204 is returned for repositories without any commits.
    if response.status == 204 || response.body.trim().is_empty() {
        tracing::debug!(repo = %repo, stat, "Empty statistics response");
        return Ok(Vec::new());
    }

    let points: Vec<T> = serde_json::from_str(&response.body)
        .map_err(|source| FetchError::Decode { endpoint: path, source })?;
    tracing::debug!(repo = %repo, stat, points = points.len(), "Fetched statistics");
    Ok(points)
}
