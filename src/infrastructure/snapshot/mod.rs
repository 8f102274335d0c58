//! Snapshot persistence
//!
//! The snapshot is a UTF-8 CSV file with columns
//! `repository,title,url,created_at` and a header row, replaced atomically on
//! every run.

pub mod reader;
pub mod writer;

pub use reader::SnapshotReader;
pub use writer::{render, SnapshotSummary, SnapshotWriter};
