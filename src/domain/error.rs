//! Error taxonomy for the ingestion pipeline
//!
//! Only credential/config errors and snapshot errors end a run. Fetch
//! errors are contained per repository and malformed records per item.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from fetching one repository's issue list
#[derive(Error, Debug)]
pub enum FetchError {
    /// Missing or rejected credentials (HTTP 401)
    #[error("Unauthorized - the API token was rejected")]
    Unauthorized,

    /// Forbidden, usually an exhausted primary rate limit (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Repository does not exist or is not visible (HTTP 404)
    #[error("Repository not found")]
    NotFound,

    /// Secondary rate limit (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimited,

    /// Upstream failure (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Any other non-success status
    #[error("Unexpected status ({0}): {1}")]
    UnexpectedStatus(StatusCode, String),

    /// The per-request timeout elapsed
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Body was not valid JSON
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Body was JSON but not a list of issues
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl FetchError {
    /// Classify a non-success status and its body
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            status if status.is_server_error() => Self::ServerError(status, body),
            _ => Self::UnexpectedStatus(status, body),
        }
    }

    /// Whether the failure came from the upstream answering with an error status
    pub const fn is_http_status(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::Forbidden(_)
                | Self::NotFound
                | Self::RateLimited
                | Self::ServerError(_, _)
                | Self::UnexpectedStatus(_, _)
        )
    }
}

/// Why a single payload could not become a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("Payload is not an issue object: {0}")]
    NotAnObject(String),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Required field '{0}' is empty")]
    EmptyField(&'static str),

    #[error("Invalid creation timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Cannot derive repository from '{0}'")]
    InvalidRepositoryReference(String),
}

/// Errors writing or reading a snapshot file
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot CSV error for {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Snapshot {path} has unexpected header: {found}")]
    Header { path: PathBuf, found: String },

    #[error("Failed to replace {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Credential errors, fatal before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("API token not found: set the {0} environment variable")]
    Missing(String),

    #[error("API token in {0} contains characters not allowed in an HTTP header")]
    InvalidHeaderValue(String),
}
