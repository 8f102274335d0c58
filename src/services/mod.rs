pub mod ingestion_orchestrator;
pub mod normalizer;
pub mod readme_updater;

pub use ingestion_orchestrator::IngestionOrchestrator;
pub use normalizer::{parse_repository_url, Normalized, ResponseNormalizer};
pub use readme_updater::{ReadmeError, ReadmeOutcome, ReadmeUpdater};
