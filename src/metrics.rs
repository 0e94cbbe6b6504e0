use crate::types::CommitRecord;
use chrono::{Datelike, NaiveDate, Timelike, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Calendar fields derived from a commit's committer timestamp, in UTC.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CommitFacts {
    pub sha: String,
    pub author_login: Option<String>,
    pub date: NaiveDate,
    /// ISO 8601 week number.
    pub week: u32,
    pub hour: u32,
    pub month: u32,
    pub year: i32,
}

impl From<&CommitRecord> for CommitFacts {
    fn from(commit: &CommitRecord) -> Self {
        let at = commit.committed_at.with_timezone(&Utc);
        CommitFacts {
            sha: commit.sha.clone(),
            author_login: commit.author_login.clone(),
            date: at.date_naive(),
            week: at.iso_week().week(),
            hour: at.hour(),
            month: at.month(),
            year: at.year(),
        }
    }
}

/// Summary of the commits made in a window of days ending today.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommitMetricSummary {
    /// Number of days in the window, today included.
    pub days: i64,
    pub num_commits: usize,
    pub avg_commits_per_day: f64,
    /// Distinct author logins; commits without a linked account are not counted.
    pub num_contributors: usize,
    /// Commit counts keyed by UTC hour of day. Hours without commits are omitted.
    pub commits_by_hour: BTreeMap<u32, usize>,
}

pub fn normalize_commits(commits: &[CommitRecord]) -> Vec<CommitFacts> {
    commits.iter().map(CommitFacts::from).collect()
}

/// Summarizes `commits` fetched for the last `days_before` days plus today.
///
/// # Arguments
/// * `commits` - The commits in the window, in any order.
/// * `days_before` - The lookback used for fetching. Negative values count as 0.
pub fn summarize_commits(commits: &[CommitRecord], days_before: i64) -> CommitMetricSummary {
    // Never below 1, so the average is always defined.
    let days = days_before.max(0).saturating_add(1);
    let facts = normalize_commits(commits);

    let num_commits = facts.len();
    let num_contributors = facts
        .iter()
        .filter_map(|c| c.author_login.as_deref())
        .collect::<HashSet<_>>()
        .len();

    let mut commits_by_hour = BTreeMap::new();
    for commit in &facts {
        *commits_by_hour.entry(commit.hour).or_insert(0) += 1;
    }

    CommitMetricSummary {
        days,
        num_commits,
        avg_commits_per_day: num_commits as f64 / days as f64,
        num_contributors,
        commits_by_hour,
    }
}
