use std::path::{Path, PathBuf};

use crate::domain::error::SnapshotError;
use crate::domain::models::{NormalizedIssueRecord, SNAPSHOT_HEADER};

/// Reads a snapshot back into records, in file order
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    path: PathBuf,
}

impl SnapshotReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load every row; a header-only snapshot yields an empty list
    pub fn read(&self) -> Result<Vec<NormalizedIssueRecord>, SnapshotError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|source| self.csv_error(source))?;

        let headers = reader.headers().map_err(|source| self.csv_error(source))?;
        if headers.iter().ne(SNAPSHOT_HEADER) {
            return Err(SnapshotError::Header {
                path: self.path.clone(),
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        reader
            .deserialize()
            .collect::<Result<Vec<NormalizedIssueRecord>, _>>()
            .map_err(|source| self.csv_error(source))
    }

    fn csv_error(&self, source: csv::Error) -> SnapshotError {
        if let csv::ErrorKind::Io(io) = source.kind() {
            return SnapshotError::Io {
                path: self.path.clone(),
                source: std::io::Error::new(io.kind(), io.to_string()),
            };
        }
        SnapshotError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::snapshot::SnapshotWriter;
    use tempfile::TempDir;

    #[test]
    fn test_reads_back_written_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("issues.csv");
        let record = NormalizedIssueRecord {
            repository: "octo/demo".to_string(),
            title: "Fix \"quoted\", typo".to_string(),
            url: "https://x/issues/1".to_string(),
            created_at: "2024-03-01".parse().unwrap(),
        };
        SnapshotWriter::new(&path).write(vec![record.clone()]).unwrap();

        let records = SnapshotReader::new(&path).read().unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn test_header_only_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("issues.csv");
        std::fs::write(&path, "repository,title,url,created_at\n").unwrap();

        assert!(SnapshotReader::new(&path).read().unwrap().is_empty());
    }

    #[test]
    fn test_unexpected_header_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("issues.csv");
        std::fs::write(&path, "repo,title\nocto/demo,x\n").unwrap();

        let err = SnapshotReader::new(&path).read().unwrap_err();
        assert!(matches!(err, SnapshotError::Header { found, .. } if found == "repo,title"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let reader = SnapshotReader::new(dir.path().join("absent.csv"));

        assert!(!reader.exists());
        assert!(matches!(reader.read(), Err(SnapshotError::Io { .. })));
    }
}
