use anyhow::Context;
use repostats::{
    AppConfig, BranchSummary, CommitMetricSummary, RepoId, RepoStats, WeeklyMetricReport,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct StatsReport {
    repo: RepoId,
    branches: BranchSummary,
    commits: CommitMetricSummary,
    weekly: WeeklyMetricReport,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout only carries the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repostats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let stats = RepoStats::new(&config).context("Failed to set up repository stats")?;
    tracing::info!(
        repo = %stats.repo(),
        days_before = config.commit_days_before,
        "Collecting stats"
    );

    let report = StatsReport {
        repo: stats.repo().clone(),
        branches: stats.branch_stats().context("Failed to compute branch stats")?,
        commits: stats
            .commit_stats(config.commit_days_before)
            .context("Failed to compute commit stats")?,
        weekly: stats
            .metric_stats()
            .context("Failed to compute weekly metric stats")?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
