//! Domain layer for issue-finder
//!
//! Core types of the ingestion pipeline and the ports its adapters implement.

pub mod error;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use error::{CredentialError, FetchError, MalformedRecord, SnapshotError};
