//! Records decoded from GitHub API responses.
//!
//! List endpoints decode into private wire structs first, which are turned into the
//! public records while the page is being decoded.

use crate::config::RepoId;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    /// Sha of the commit at the tip of the branch.
    pub commit_sha: String,
    pub protected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub sha: String,
    /// Login of the GitHub account linked to the commit author, absent for unlinked emails.
    pub author_login: Option<String>,
    pub committed_at: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub repo: RepoId,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author_login: Option<String>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// An issue as listed by `/issues`. GitHub lists pull requests there too.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub repo: RepoId,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author_login: Option<String>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub is_pull_request: bool,
}

/// One week of `/stats/code_frequency`, as reported (deletions are negative).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "(i64, i64, i64)")]
pub struct CodeFrequencyPoint {
    pub week: DateTime<Utc>,
    pub additions: i64,
    pub deletions: i64,
}

impl TryFrom<(i64, i64, i64)> for CodeFrequencyPoint {
    type Error = String;

    fn try_from((week, additions, deletions): (i64, i64, i64)) -> Result<Self, Self::Error> {
        Ok(Self {
            week: week_start(week)?,
            additions,
            deletions,
        })
    }
}

/// One week of `/stats/commit_activity`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CommitActivityPoint {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub week: DateTime<Utc>,
    pub total: i64,
    /// Commits per day, starting on Sunday.
    #[serde(default)]
    pub days: Vec<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum AccountType {
    User,
    Bot,
    Organization,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Contributor {
    pub login: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ContributorWeek {
    #[serde(rename = "w", with = "chrono::serde::ts_seconds")]
    pub week: DateTime<Utc>,
    #[serde(rename = "a")]
    pub additions: i64,
    #[serde(rename = "d")]
    pub deletions: i64,
    #[serde(rename = "c")]
    pub commits: i64,
}

/// One entry of `/stats/contributors`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ContributorActivity {
    /// Absent when GitHub could not link the contributions to an account.
    pub author: Option<Contributor>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub weeks: Vec<ContributorWeek>,
}

fn week_start(epoch_seconds: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp(epoch_seconds, 0)
        .ok_or_else(|| format!("week start {epoch_seconds} is out of range"))
}

#[derive(Deserialize)]
struct UserRef {
    login: String,
}

#[derive(Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Deserialize)]
pub(crate) struct BranchWire {
    name: String,
    commit: ShaRef,
    #[serde(default)]
    protected: bool,
}

impl From<BranchWire> for Branch {
    fn from(wire: BranchWire) -> Self {
        Branch {
            name: wire.name,
            commit_sha: wire.commit.sha,
            protected: wire.protected,
        }
    }
}

#[derive(Deserialize)]
struct Signature {
    date: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
struct CommitDetail {
    committer: Signature,
}

#[derive(Deserialize)]
pub(crate) struct CommitWire {
    sha: String,
    author: Option<UserRef>,
    commit: CommitDetail,
}

impl From<CommitWire> for CommitRecord {
    fn from(wire: CommitWire) -> Self {
        CommitRecord {
            sha: wire.sha,
            author_login: wire.author.map(|user| user.login),
            committed_at: wire.commit.committer.date,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct PullWire {
    number: u64,
    title: String,
    state: String,
    user: Option<UserRef>,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl PullWire {
    pub(crate) fn into_record(self, repo: &RepoId) -> PullRequest {
        PullRequest {
            repo: repo.clone(),
            number: self.number,
            title: self.title,
            state: self.state,
            author_login: self.user.map(|user| user.login),
            created_at: self.created_at,
            merged_at: self.merged_at,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct IssueWire {
    number: u64,
    title: String,
    state: String,
    user: Option<UserRef>,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    pull_request: Option<serde_json::Value>,
}

impl IssueWire {
    pub(crate) fn into_record(self, repo: &RepoId) -> Issue {
        Issue {
            repo: repo.clone(),
            number: self.number,
            title: self.title,
            state: self.state,
            author_login: self.user.map(|user| user.login),
            created_at: self.created_at,
            closed_at: self.closed_at,
            is_pull_request: self.pull_request.is_some(),
        }
    }
}
