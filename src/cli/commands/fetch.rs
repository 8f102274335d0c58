//! Implementation of the `issue-finder fetch` command.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::{Config, RepositoryOutcome, SourceOutcome};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::credentials::{load_token, ApiToken};
use crate::infrastructure::github::{GitHubClient, GitHubClientConfig, TokenBucketRateLimiter};
use crate::infrastructure::snapshot::{render, SnapshotSummary, SnapshotWriter};
use crate::services::IngestionOrchestrator;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Snapshot path (overrides `snapshot.path`)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the CSV to stdout instead of replacing the snapshot
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub repositories: Vec<RepositoryOutcome>,
    pub records: usize,
    pub collapsed: usize,
    pub failures: usize,
    /// Set when the snapshot was replaced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotSummary>,
    /// Set on a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,
}

impl CommandOutput for FetchOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["repository", "status", "received", "accepted", "foreign", "malformed"]);
        for entry in &self.repositories {
            let row = match &entry.outcome {
                SourceOutcome::Fetched { stats } => vec![
                    entry.repository.to_string(),
                    "ok".to_string(),
                    stats.received.to_string(),
                    stats.accepted.to_string(),
                    stats.foreign.to_string(),
                    stats.malformed.to_string(),
                ],
                SourceOutcome::Failed { reason } => vec![
                    entry.repository.to_string(),
                    format!("failed: {}", truncate(reason, 60)),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ],
            };
            table.add_row(row);
        }

        let mut lines = vec![format!("Run {}", self.run_id)];
        if !self.repositories.is_empty() {
            lines.push(table.to_string());
        }
        lines.push(format!(
            "{} unique issue(s), {} duplicate(s) collapsed, {} repositor{} failed",
            self.records,
            self.collapsed,
            self.failures,
            if self.failures == 1 { "y" } else { "ies" }
        ));
        match (&self.snapshot, &self.csv) {
            (Some(summary), _) => {
                lines.push(format!("Wrote {} row(s) to {}", summary.rows, summary.path.display()));
            }
            (None, Some(csv)) => {
                lines.push(String::new());
                lines.push(csv.trim_end().to_string());
            }
            (None, None) => {}
        }
        lines.join("\n")
    }
}

pub async fn execute(args: FetchArgs, config: &Config, json_mode: bool) -> Result<()> {
    let result = run(config, args.output, args.dry_run).await?;
    output(&result, json_mode);
    Ok(())
}

/// Resolve the token, then run the pipeline
///
/// A missing token fails here, before any request is sent.
pub async fn run(config: &Config, output_path: Option<PathBuf>, dry_run: bool) -> Result<FetchOutput> {
    let token = load_token(&config.github.token_env)
        .context("Cannot fetch issues without an API token")?;
    run_with_token(config, token, output_path, dry_run).await
}

/// Fetch every repository, then replace the snapshot (or render it on a dry run)
pub async fn run_with_token(
    config: &Config,
    token: ApiToken,
    output_path: Option<PathBuf>,
    dry_run: bool,
) -> Result<FetchOutput> {
    let registry = Arc::new(ConfigLoader::registry(config)?);
    let query = ConfigLoader::query(config)?;

    let client = GitHubClient::new(GitHubClientConfig::from_config(&config.github, token))
        .context("Failed to create GitHub client")?;
    let rate_limiter = TokenBucketRateLimiter::new(
        config.rate_limit.requests_per_second,
        config.rate_limit.burst_size,
    );

    let orchestrator = IngestionOrchestrator::new(Arc::new(client), registry, query, rate_limiter)
        .with_max_concurrent_fetches(config.ingestion.max_concurrent_fetches);

    let run = orchestrator.run().await;

    let run_id = run.id();
    let started_at = run.started_at();
    let repositories = run.outcomes().to_vec();
    let records = run.record_count();
    let collapsed = run.collapsed_count();
    let failures = run.failure_count();
    let rows = run.into_records();

    let (snapshot, csv) = if dry_run {
        (None, Some(render(rows).context("Failed to render snapshot")?))
    } else {
        let path = output_path.unwrap_or_else(|| config.snapshot.path.clone());
        let summary = SnapshotWriter::new(path)
            .write(rows)
            .context("Failed to write snapshot")?;
        (Some(summary), None)
    };

    Ok(FetchOutput {
        run_id,
        started_at,
        repositories,
        records,
        collapsed,
        failures,
        snapshot,
        csv,
    })
}
