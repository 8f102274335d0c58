use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::error::SnapshotError;
use crate::domain::models::{NormalizedIssueRecord, SNAPSHOT_HEADER};

/// What a successful write produced
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SnapshotSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes the CSV snapshot with atomic replace semantics
///
/// Rows are written to a temporary file in the target directory, flushed to
/// disk, then renamed over the canonical path. Readers see either the previous
/// snapshot or the new one, never a partial file. If anything fails the
/// previous snapshot is left as it was.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `records` as the new snapshot
    ///
    /// Output is deterministic: header first, then rows ordered by repository
    /// and newest creation date (see [`NormalizedIssueRecord::snapshot_order`]).
    /// An empty slice produces a header-only file.
    pub fn write(&self, mut records: Vec<NormalizedIssueRecord>) -> Result<SnapshotSummary, SnapshotError> {
        records.sort_by(NormalizedIssueRecord::snapshot_order);

        let dir = self.target_dir();
        std::fs::create_dir_all(&dir).map_err(|source| self.io_error(source))?;

        let tmp = NamedTempFile::new_in(&dir).map_err(|source| self.io_error(source))?;
        debug!(tmp = %tmp.path().display(), "Writing snapshot to temporary file");

        let file = encode(tmp.as_file(), &records).map_err(|source| SnapshotError::Csv {
            path: self.path.clone(),
            source,
        })?;
        carry_permissions(file, &self.path).map_err(|source| self.io_error(source))?;
        file.sync_all().map_err(|source| self.io_error(source))?;

        tmp.persist(&self.path).map_err(|e| SnapshotError::Replace {
            path: self.path.clone(),
            source: e.error,
        })?;

        info!(path = %self.path.display(), rows = records.len(), "Snapshot written");

        Ok(SnapshotSummary {
            path: self.path.clone(),
            rows: records.len(),
        })
    }

    fn target_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Give a replacement file the permissions of the file it will replace
///
/// Temporary files are created owner-only; a new target gets 0644.
pub(crate) fn carry_permissions(file: &File, target: &Path) -> io::Result<()> {
    match std::fs::metadata(target) {
        Ok(meta) => file.set_permissions(meta.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => default_permissions(file),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn default_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Encode header and rows into `out`, returning it once flushed
fn encode<W: Write>(out: W, records: &[NormalizedIssueRecord]) -> Result<W, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(SNAPSHOT_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

/// Render `records` exactly as [`SnapshotWriter::write`] would, without touching disk
pub fn render(mut records: Vec<NormalizedIssueRecord>) -> Result<String, csv::Error> {
    records.sort_by(NormalizedIssueRecord::snapshot_order);
    let bytes = encode(Vec::new(), &records)?;
    // csv output of String fields is valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
