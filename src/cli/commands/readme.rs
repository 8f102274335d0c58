//! Implementation of the `issue-finder readme` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::{ReadmeOutcome, ReadmeUpdater};

#[derive(Args, Debug)]
pub struct ReadmeArgs {
    /// Snapshot to read (defaults to `snapshot.path`)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// README to update (defaults to `readme.path`)
    #[arg(long)]
    pub readme: Option<PathBuf>,
}

impl CommandOutput for ReadmeOutcome {
    fn to_human(&self) -> String {
        match self {
            Self::Updated { readme, rows } => {
                format!("Updated {} with {} issue(s)", readme.display(), rows)
            }
            Self::Unchanged { readme, rows } => {
                format!("{} already lists the current {} issue(s)", readme.display(), rows)
            }
            Self::MissingSnapshot { snapshot } => {
                format!("No snapshot at {}; run `issue-finder fetch` first", snapshot.display())
            }
            Self::MissingMarkers { readme } => {
                format!("{} has no issue markers; nothing to update", readme.display())
            }
        }
    }
}

pub fn execute(args: ReadmeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let outcome = run(config, args.snapshot, args.readme)?;
    output(&outcome, json_mode);
    Ok(())
}

pub fn run(config: &Config, snapshot: Option<PathBuf>, readme: Option<PathBuf>) -> Result<ReadmeOutcome> {
    let snapshot = snapshot.unwrap_or_else(|| config.snapshot.path.clone());
    let mut updater = ReadmeUpdater::from_config(&config.readme, snapshot);
    if let Some(path) = readme {
        updater = updater.with_readme_path(path);
    }
    updater.update().context("Failed to update README")
}
