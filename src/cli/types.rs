//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::fetch::FetchArgs;
use crate::cli::commands::readme::ReadmeArgs;

#[derive(Parser, Debug)]
#[command(name = "issue-finder")]
#[command(about = "Collect beginner-friendly GitHub issues into a CSV snapshot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (replaces .issue-finder/config.yaml and local.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch issues from every configured repository and rewrite the snapshot
    Fetch(FetchArgs),

    /// Refresh the issue table in the README from the current snapshot
    Readme(ReadmeArgs),

    /// List the configured repositories
    Repos,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "issue-finder",
            "fetch",
            "--output",
            "out/issues.csv",
            "--json",
            "--config",
            "custom.yaml",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.output, Some(PathBuf::from("out/issues.csv")));
                assert!(!args.dry_run);
            }
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_repos() {
        let cli = Cli::try_parse_from(["issue-finder", "repos"]).unwrap();
        assert!(matches!(cli.command, Commands::Repos));
        assert!(!cli.json);
    }
}
