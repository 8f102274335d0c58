use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One unvalidated issue object as returned by the upstream API
///
/// Only the normalizer looks inside. Everything else moves it around
/// whole, so a single odd item never fails the page it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub struct RawIssuePayload(serde_json::Value);

impl RawIssuePayload {
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Snapshot column order
pub const SNAPSHOT_HEADER: [&str; 4] = ["repository", "title", "url", "created_at"];

/// The canonical, display-ready form of one issue
///
/// `url` is the natural key: two records with the same url are the same issue.
/// Field order here is the snapshot column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedIssueRecord {
    pub repository: String,
    pub title: String,
    pub url: String,
    pub created_at: NaiveDate,
}

impl NormalizedIssueRecord {
    /// Snapshot row ordering: repository ascending, newest first, then url
    ///
    /// The url tie-break makes the order total so snapshots are reproducible.
    pub fn snapshot_order(&self, other: &Self) -> std::cmp::Ordering {
        self.repository
            .cmp(&other.repository)
            .then_with(|| other.created_at.cmp(&self.created_at))
            .then_with(|| self.url.cmp(&other.url))
    }
}
