pub mod config;
pub mod issue;
pub mod query;
pub mod repository;
pub mod run;

pub use config::{
    Config, GitHubConfig, IngestionConfig, LoggingConfig, QueryConfig, RateLimitConfig,
    ReadmeConfig, SnapshotConfig,
};
pub use issue::{NormalizedIssueRecord, RawIssuePayload, SNAPSHOT_HEADER};
pub use query::{
    InvalidQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, IssueQuery, IssueState, SortDirection, SortField,
};
pub use repository::{InvalidRepositoryId, RepositoryRegistry, TargetRepository};
pub use run::{IngestionRun, NormalizationStats, RepositoryOutcome, SourceOutcome};
