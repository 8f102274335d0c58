//! Port trait definitions (Hexagonal Architecture)
//!
//! - IssueSource: one-page issue listing for a single repository
//!
//! The orchestrator depends only on these traits, so the GitHub client can be
//! swapped for a stub in tests.

pub mod issue_source;

pub use issue_source::IssueSource;
