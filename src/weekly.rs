//! Weekly metric aggregation.
//!
//! Three independently shaped weekly series are aligned on their week start:
//! commit activity defines the rows, code frequency and the folded contributor
//! breakdown are attached where a matching week exists. The most recent row is then
//! compared with trailing means over the rows before it.

use crate::error::AggregationError;
use crate::types::{AccountType, CodeFrequencyPoint, CommitActivityPoint, ContributorActivity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct CodeFrequencyRow {
    pub week: DateTime<Utc>,
    pub additions: i64,
    /// Lines removed, as a non-negative count.
    pub deletions: i64,
}

pub fn normalize_code_frequency(points: &[CodeFrequencyPoint]) -> Vec<CodeFrequencyRow> {
    points
        .iter()
        .map(|point| CodeFrequencyRow {
            week: point.week,
            additions: point.additions,
            deletions: point.deletions.abs(),
        })
        .collect()
}

/// Activity of the human contributors who committed in a given week.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct TopContributorWeek {
    pub week: DateTime<Utc>,
    /// Number of users with at least one commit that week.
    pub top_contributors: i64,
    pub additions: i64,
    pub deletions: i64,
    pub commits: i64,
}

/// Groups the per-contributor weekly breakdowns by week.
///
/// Only accounts of type `User` count, and only in weeks where they committed.
fn fold_contributors(
    contributors: &[ContributorActivity],
) -> BTreeMap<DateTime<Utc>, TopContributorWeek> {
    let mut by_week = BTreeMap::new();

    let users = contributors.iter().filter(|contributor| {
        contributor
            .author
            .as_ref()
            .is_some_and(|author| author.kind == AccountType::User)
    });

    for contributor in users {
        for week in contributor.weeks.iter().filter(|week| week.commits > 0) {
            let row = by_week.entry(week.week).or_insert(TopContributorWeek {
                week: week.week,
                top_contributors: 0,
                additions: 0,
                deletions: 0,
                commits: 0,
            });
            row.top_contributors += 1;
            row.additions += week.additions;
            row.deletions += week.deletions;
            row.commits += week.commits;
        }
    }

    by_week
}

/// One week of the aligned report. Columns without data for the week are `None`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct AlignedWeek {
    pub week: DateTime<Utc>,
    pub commits: i64,
    pub additions: Option<i64>,
    pub deletions: Option<i64>,
    pub top_contributors: Option<i64>,
    pub top_contributors_additions: Option<i64>,
    pub top_contributors_deletions: Option<i64>,
    pub top_contributors_commits: Option<i64>,
}

/// Aligns the three weekly series on week start, oldest week first.
///
/// Every week of `commit_activity` produces exactly one row. Weeks that only appear
/// in the other series are dropped.
pub fn align_weekly_series(
    commit_activity: &[CommitActivityPoint],
    code_frequency: &[CodeFrequencyPoint],
    contributors: &[ContributorActivity],
) -> Vec<AlignedWeek> {
    let code_frequency: HashMap<DateTime<Utc>, CodeFrequencyRow> =
        normalize_code_frequency(code_frequency)
            .into_iter()
            .map(|row| (row.week, row))
            .collect();
    let contributors = fold_contributors(contributors);

    let mut anchor = BTreeMap::new();
    for point in commit_activity {
        if anchor.insert(point.week, point.total).is_some() {
            tracing::warn!(
                week = %point.week,
                "Duplicate week in commit activity, keeping the last one"
            );
        }
    }

    anchor
        .into_iter()
        .map(|(week, commits)| {
            let code = code_frequency.get(&week);
            let top = contributors.get(&week);
            AlignedWeek {
                week,
                commits,
                additions: code.map(|c| c.additions),
                deletions: code.map(|c| c.deletions),
                top_contributors: top.map(|t| t.top_contributors),
                top_contributors_additions: top.map(|t| t.additions),
                top_contributors_deletions: top.map(|t| t.deletions),
                top_contributors_commits: top.map(|t| t.commits),
            }
        })
        .collect()
}

/// Trailing windows the current week is compared against, labelled in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingWindow {
    OneMonth,
    ThreeMonths,
    SixMonths,
    TwelveMonths,
}

impl TrailingWindow {
    /// Number of weekly rows in the window; `None` spans the whole history.
    pub fn weeks(self) -> Option<usize> {
        match self {
            TrailingWindow::OneMonth => Some(4),
            TrailingWindow::ThreeMonths => Some(12),
            TrailingWindow::SixMonths => Some(24),
            TrailingWindow::TwelveMonths => None,
        }
    }
}

/// Mean of the last `weeks` entries of `history` (all of them for `None`, or when
/// fewer exist). Missing values are skipped; a window without values has no mean.
pub fn trailing_mean(history: &[Option<i64>], weeks: Option<usize>) -> Option<f64> {
    let start = weeks.map_or(0, |n| history.len().saturating_sub(n));
    let values: Vec<i64> = history[start..].iter().flatten().copied().collect();

    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct TrailingWindowMeans {
    pub mean1: Option<f64>,
    pub mean3: Option<f64>,
    pub mean6: Option<f64>,
    pub mean12: Option<f64>,
}

impl TrailingWindowMeans {
    pub fn over(history: &[Option<i64>]) -> Self {
        let mean = |window: TrailingWindow| trailing_mean(history, window.weeks());
        Self {
            mean1: mean(TrailingWindow::OneMonth),
            mean3: mean(TrailingWindow::ThreeMonths),
            mean6: mean(TrailingWindow::SixMonths),
            mean12: mean(TrailingWindow::TwelveMonths),
        }
    }
}

/// Current value minus each trailing mean, truncated toward zero.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct WindowDeltas {
    pub diff1: Option<i64>,
    pub diff3: Option<i64>,
    pub diff6: Option<i64>,
    pub diff12: Option<i64>,
}

fn delta(current: Option<i64>, mean: Option<f64>) -> Option<i64> {
    Some((current? as f64 - mean?).trunc() as i64)
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct WeeklyMetric {
    pub current: Option<i64>,
    pub means: TrailingWindowMeans,
    pub diff: WindowDeltas,
}

impl WeeklyMetric {
    fn compute(current: Option<i64>, history: &[Option<i64>]) -> Self {
        let means = TrailingWindowMeans::over(history);
        Self {
            current,
            means,
            diff: WindowDeltas {
                diff1: delta(current, means.mean1),
                diff3: delta(current, means.mean3),
                diff6: delta(current, means.mean6),
                diff12: delta(current, means.mean12),
            },
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WeeklyMetricReport {
    /// Start of the most recent week.
    pub week: DateTime<Utc>,
    /// Number of weeks before the current one the means were computed over.
    pub history_weeks: usize,
    pub commits: WeeklyMetric,
    pub additions: WeeklyMetric,
    pub deletions: WeeklyMetric,
    pub top_contributors: Option<i64>,
}

/// Compares the last row of `rows` (oldest first) with the rows before it.
pub fn report_from_aligned(rows: &[AlignedWeek]) -> Result<WeeklyMetricReport, AggregationError> {
    let (current, history) = rows.split_last().ok_or(AggregationError::NoAlignedRows)?;
    if history.is_empty() {
        return Err(AggregationError::InsufficientHistory { rows: rows.len() });
    }

    let column = |value: fn(&AlignedWeek) -> Option<i64>| -> Vec<Option<i64>> {
        history.iter().map(value).collect()
    };

    Ok(WeeklyMetricReport {
        week: current.week,
        history_weeks: history.len(),
        commits: WeeklyMetric::compute(Some(current.commits), &column(|r| Some(r.commits))),
        additions: WeeklyMetric::compute(current.additions, &column(|r| r.additions)),
        deletions: WeeklyMetric::compute(current.deletions, &column(|r| r.deletions)),
        top_contributors: current.top_contributors,
    })
}

pub fn build_weekly_report(
    commit_activity: &[CommitActivityPoint],
    code_frequency: &[CodeFrequencyPoint],
    contributors: &[ContributorActivity],
) -> Result<WeeklyMetricReport, AggregationError> {
    let rows = align_weekly_series(commit_activity, code_frequency, contributors);
    tracing::debug!(rows = rows.len(), "Aligned weekly series");
    report_from_aligned(&rows)
}
