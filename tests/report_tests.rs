mod common;

use chrono::{TimeZone, Utc};
use common::{commit_json, ok, page, repo, status, ScriptedTransport};
use pretty_assertions::assert_eq;
use repostats::{AggregationError, ConfigError, Error, FetchError, RepoStats};
use serde_json::{json, Value};

// 2024-01-07, a Sunday.
const FIRST_WEEK: i64 = 1_704_585_600;
const WEEK: i64 = 7 * 24 * 3600;

fn stats_with(transport: &ScriptedTransport) -> RepoStats {
    RepoStats::with_transport(repo(), Box::new(transport.clone()))
}

fn commit_activity(totals: &[i64]) -> Value {
    json!(totals
        .iter()
        .enumerate()
        .map(|(i, total)| json!({
            "days": [0, *total, 0, 0, 0, 0, 0],
            "total": total,
            "week": FIRST_WEEK + i as i64 * WEEK
        }))
        .collect::<Vec<_>>())
}

#[test]
fn test_commit_stats() {
    let transport = ScriptedTransport::new();
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    transport.respond(
        "/repos/octo/widgets/commits",
        page(
            vec![
                commit_json("c1", Some("alice"), "2024-03-15T09:00:00Z"),
                commit_json("c2", Some("bob"), "2024-03-14T09:30:00Z"),
                commit_json("c3", Some("alice"), "2024-03-13T17:00:00Z"),
                commit_json("c4", None, "2024-03-12T17:00:00Z"),
            ],
            false,
        ),
    );

    let summary = stats_with(&transport).commit_stats_at(3, now).unwrap();

    assert_eq!(summary.num_commits, 4);
    assert_eq!(summary.days, 4);
    assert_eq!(summary.avg_commits_per_day, 1.0);
    assert_eq!(summary.num_contributors, 2);
    assert_eq!(summary.commits_by_hour.get(&17), Some(&2));
}

#[test]
fn test_commit_stats_without_commits() {
    let transport = ScriptedTransport::new();
    transport.respond("/repos/octo/widgets/commits", ok(json!([])));

    let summary = stats_with(&transport).commit_stats(30).unwrap();

    assert_eq!(summary.num_commits, 0);
    assert_eq!(summary.avg_commits_per_day, 0.0);
    assert_eq!(summary.num_contributors, 0);
}

#[test]
fn test_commit_stats_rejects_out_of_range_lookback() {
    let transport = ScriptedTransport::new();
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

    let err = stats_with(&transport)
        .commit_stats_at(i64::MAX, now)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidLookback(i64::MAX))
    ));
    assert!(transport.requests().is_empty());
}

#[test]
fn test_metric_stats() {
    let transport = ScriptedTransport::new();
    transport
        .respond(
            "/repos/octo/widgets/stats/code_frequency",
            ok(json!([
                [FIRST_WEEK, 100, -10],
                [FIRST_WEEK + WEEK, 200, -20],
                [FIRST_WEEK + 5 * WEEK, 600, -60]
            ])),
        )
        .respond(
            "/repos/octo/widgets/stats/commit_activity",
            ok(commit_activity(&[10, 20, 30, 40, 50, 60])),
        )
        .respond(
            "/repos/octo/widgets/stats/contributors",
            ok(json!([
                {
                    "author": { "login": "alice", "type": "User" },
                    "total": 9,
                    "weeks": [
                        { "w": FIRST_WEEK + 5 * WEEK, "a": 400, "d": 40, "c": 6 },
                        { "w": FIRST_WEEK + 4 * WEEK, "a": 0, "d": 0, "c": 0 }
                    ]
                },
                {
                    "author": { "login": "github-actions[bot]", "type": "Bot" },
                    "total": 5,
                    "weeks": [{ "w": FIRST_WEEK + 5 * WEEK, "a": 9, "d": 9, "c": 5 }]
                }
            ])),
        );

    let report = stats_with(&transport).metric_stats().unwrap();

    assert_eq!(report.week.timestamp(), FIRST_WEEK + 5 * WEEK);
    assert_eq!(report.history_weeks, 5);
    assert_eq!(report.commits.current, Some(60));
    assert_eq!(report.commits.diff.diff1, Some(25));
    assert_eq!(report.commits.diff.diff3, Some(30));
    assert_eq!(report.commits.diff.diff12, Some(30));
    assert_eq!(report.additions.current, Some(600));
    // Only weeks 0 and 1 have code frequency data in the history.
    assert_eq!(report.additions.means.mean1, Some(200.0));
    assert_eq!(report.additions.means.mean3, Some(150.0));
    assert_eq!(report.deletions.current, Some(60));
    assert_eq!(report.deletions.diff.diff12, Some(45));
    assert_eq!(report.top_contributors, Some(1));
}

#[test]
fn test_metric_stats_pending_statistics() {
    let transport = ScriptedTransport::new();
    transport.respond("/repos/octo/widgets/stats/code_frequency", status(202));

    let err = stats_with(&transport).metric_stats().unwrap_err();

    match err {
        Error::Fetch(err @ FetchError::Pending { .. }) => {
            assert_eq!(err.endpoint(), "/repos/octo/widgets/stats/code_frequency")
        }
        other => panic!("expected pending statistics, got {other:?}"),
    }
}

#[test]
fn test_metric_stats_malformed_statistics() {
    let transport = ScriptedTransport::new();
    transport.respond(
        "/repos/octo/widgets/stats/code_frequency",
        ok(json!({ "message": "Server Error" })),
    );

    let err = stats_with(&transport).metric_stats().unwrap_err();

    match err {
        Error::Fetch(err @ FetchError::Decode { .. }) => {
            assert_eq!(err.endpoint(), "/repos/octo/widgets/stats/code_frequency")
        }
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn test_metric_stats_needs_history() {
    let transport = ScriptedTransport::new();
    transport
        .respond("/repos/octo/widgets/stats/code_frequency", status(204))
        .respond(
            "/repos/octo/widgets/stats/commit_activity",
            ok(commit_activity(&[4])),
        )
        .respond("/repos/octo/widgets/stats/contributors", ok(json!([])));

    let err = stats_with(&transport).metric_stats().unwrap_err();

    assert!(matches!(
        err,
        Error::Aggregation(AggregationError::InsufficientHistory { rows: 1 })
    ));
}

#[test]
fn test_metric_stats_without_activity() {
    let transport = ScriptedTransport::new();
    transport
        .respond("/repos/octo/widgets/stats/code_frequency", ok(json!([])))
        .respond("/repos/octo/widgets/stats/commit_activity", ok(json!([])))
        .respond("/repos/octo/widgets/stats/contributors", ok(json!([])));

    let err = stats_with(&transport).metric_stats().unwrap_err();

    assert!(matches!(
        err,
        Error::Aggregation(AggregationError::NoAlignedRows)
    ));
}
