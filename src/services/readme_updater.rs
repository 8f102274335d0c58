//! README table refresh
//!
//! Renders the current snapshot as a Markdown table and splices it between two
//! marker comments in a README. Everything outside the markers is preserved.

use comfy_table::{presets, Cell, ContentArrangement, Table};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::error::SnapshotError;
use crate::domain::models::{NormalizedIssueRecord, ReadmeConfig};
use crate::infrastructure::snapshot::writer::carry_permissions;
use crate::infrastructure::snapshot::SnapshotReader;

/// Failures that stop a README refresh
#[derive(Error, Debug)]
pub enum ReadmeError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a refresh did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadmeOutcome {
    /// The block between the markers was replaced
    Updated { readme: PathBuf, rows: usize },
    /// The rendered block already matched; nothing was written
    Unchanged { readme: PathBuf, rows: usize },
    /// No snapshot exists yet
    MissingSnapshot { snapshot: PathBuf },
    /// The markers are absent or out of order
    MissingMarkers { readme: PathBuf },
}

/// Rewrites the marked region of a README from a snapshot file
#[derive(Debug, Clone)]
pub struct ReadmeUpdater {
    readme_path: PathBuf,
    snapshot_path: PathBuf,
    start_marker: String,
    end_marker: String,
    empty_message: String,
}

impl ReadmeUpdater {
    pub fn from_config(config: &ReadmeConfig, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            readme_path: config.path.clone(),
            snapshot_path: snapshot_path.into(),
            start_marker: config.start_marker.clone(),
            end_marker: config.end_marker.clone(),
            empty_message: config.empty_message.clone(),
        }
    }

    #[must_use]
    pub fn with_readme_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.readme_path = path.into();
        self
    }

    pub fn readme_path(&self) -> &Path {
        &self.readme_path
    }

    pub fn update(&self) -> Result<ReadmeOutcome, ReadmeError> {
        let reader = SnapshotReader::new(&self.snapshot_path);
        if !reader.exists() {
            warn!(snapshot = %self.snapshot_path.display(), "Snapshot not found, README left untouched");
            return Ok(ReadmeOutcome::MissingSnapshot {
                snapshot: self.snapshot_path.clone(),
            });
        }
        let records = reader.read()?;
        let rows = records.len();

        let current = std::fs::read_to_string(&self.readme_path).map_err(|source| ReadmeError::Read {
            path: self.readme_path.clone(),
            source,
        })?;

        let block = render_table(&records, &self.empty_message);
        let Some(updated) = splice(&current, &self.start_marker, &self.end_marker, &block) else {
            warn!(readme = %self.readme_path.display(), "Markers not found, README left untouched");
            return Ok(ReadmeOutcome::MissingMarkers {
                readme: self.readme_path.clone(),
            });
        };

        if updated == current {
            return Ok(ReadmeOutcome::Unchanged {
                readme: self.readme_path.clone(),
                rows,
            });
        }

        self.replace(&updated)?;
        info!(readme = %self.readme_path.display(), rows, "README updated");
        Ok(ReadmeOutcome::Updated {
            readme: self.readme_path.clone(),
            rows,
        })
    }

    fn replace(&self, contents: &str) -> Result<(), ReadmeError> {
        let write_err = |source| ReadmeError::Write {
            path: self.readme_path.clone(),
            source,
        };
        let dir = match self.readme_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        carry_permissions(tmp.as_file(), &self.readme_path).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.readme_path)
            .map_err(|err| write_err(err.error))?;
        Ok(())
    }
}

/// Render records as a Markdown table, or `empty_message` when there are none
pub fn render_table(records: &[NormalizedIssueRecord], empty_message: &str) -> String {
    if records.is_empty() {
        return empty_message.to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_MARKDOWN)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["Repository", "Issue", "Created"]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.repository),
            Cell::new(format!("[{}]({})", escape_markdown(&record.title), record.url)),
            Cell::new(record.created_at.format("%Y-%m-%d")),
        ]);
    }
    table.to_string()
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace(['\r', '\n'], " ")
}

/// Replace whatever sits between `start` and `end` with `block`
///
/// Returns `None` when either marker is missing or `end` precedes `start`.
pub fn splice(document: &str, start: &str, end: &str, block: &str) -> Option<String> {
    let start_at = document.find(start)?;
    let body_at = start_at + start.len();
    let end_at = body_at + document[body_at..].find(end)?;

    let mut out = String::with_capacity(document.len() + block.len());
    out.push_str(&document[..body_at]);
    out.push('\n');
    out.push_str(block);
    out.push('\n');
    out.push_str(&document[end_at..]);
    Some(out)
}
