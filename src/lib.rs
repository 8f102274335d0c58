//! issue-finder - beginner-friendly GitHub issue ingestion
//!
//! Queries a fixed registry of repositories for issues carrying onboarding
//! labels, normalizes the responses into uniform records and replaces a CSV
//! snapshot atomically on every run.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): records, queries, run results and the `IssueSource` port
//! - **Service Layer** (`services`): normalization, orchestration and README refresh
//! - **Infrastructure Layer** (`infrastructure`): GitHub client, config, credentials, logging, snapshot files
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use issue_finder::{ConfigLoader, GitHubClient, GitHubClientConfig, IngestionOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let token = issue_finder::infrastructure::credentials::load_token(&config.github.token_env)?;
//!     let client = GitHubClient::new(GitHubClientConfig::from_config(&config.github, token))?;
//!     let orchestrator = IngestionOrchestrator::new(
//!         Arc::new(client),
//!         Arc::new(ConfigLoader::registry(&config)?),
//!         ConfigLoader::query(&config)?,
//!         issue_finder::TokenBucketRateLimiter::new(1.0, 1),
//!     );
//!     let run = orchestrator.run().await;
//!     issue_finder::SnapshotWriter::new("issues.csv").write(run.into_records())?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::error::{CredentialError, FetchError, MalformedRecord, SnapshotError};
pub use domain::models::{
    Config, IngestionRun, IssueQuery, NormalizedIssueRecord, RawIssuePayload, RepositoryOutcome,
    RepositoryRegistry, SourceOutcome, TargetRepository,
};
pub use domain::ports::IssueSource;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::github::{GitHubClient, GitHubClientConfig, TokenBucketRateLimiter};
pub use infrastructure::snapshot::{SnapshotReader, SnapshotWriter};
pub use services::{IngestionOrchestrator, ReadmeUpdater, ResponseNormalizer};
