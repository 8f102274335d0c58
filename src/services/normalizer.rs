//! Response normalization
//!
//! Turns one raw issue payload into a [`NormalizedIssueRecord`], or explains
//! why it cannot. Repository identity comes from the payload's own
//! repository reference, never from the repository the caller asked about.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::domain::error::MalformedRecord;
use crate::domain::models::{
    IssueQuery, NormalizationStats, NormalizedIssueRecord, RawIssuePayload, RepositoryRegistry,
    TargetRepository,
};

/// Result of normalizing one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// A record ready for the snapshot
    Record(NormalizedIssueRecord),
    /// The payload belongs to a repository outside the registry, or carries
    /// none of the required labels; dropped silently
    Foreign(String),
}

/// Fields of an issue object the pipeline cares about
///
/// Every field is optional so that absence is reported as a malformed record
/// rather than a deserialization failure.
#[derive(Debug, Deserialize)]
struct IssueFields {
    title: Option<String>,
    html_url: Option<String>,
    created_at: Option<String>,
    repository_url: Option<String>,
    repository: Option<RepositoryRef>,
    labels: Option<Vec<LabelRef>>,
}

/// Nested repository object, as found in search-style payloads
#[derive(Debug, Deserialize)]
struct RepositoryRef {
    full_name: Option<String>,
    url: Option<String>,
}

/// Labels arrive either as objects with a name or as bare strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelRef {
    Named { name: String },
    Bare(String),
}

impl LabelRef {
    fn name(&self) -> &str {
        match self {
            Self::Named { name } | Self::Bare(name) => name,
        }
    }
}

/// Maps raw payloads to canonical records against a fixed registry
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    registry: Arc<RepositoryRegistry>,
    query: Option<IssueQuery>,
}

impl ResponseNormalizer {
    pub const fn new(registry: Arc<RepositoryRegistry>) -> Self {
        Self {
            registry,
            query: None,
        }
    }

    /// Also drop payloads whose labels include none of `query`'s labels
    ///
    /// Payloads that do not list labels at all are kept.
    #[must_use]
    pub fn with_label_check(mut self, query: IssueQuery) -> Self {
        self.query = Some(query);
        self
    }

    /// Normalize one payload
    ///
    /// # Returns
    /// * `Ok(Normalized::Record)` - a valid record for a registered repository
    /// * `Ok(Normalized::Foreign)` - a valid payload to be dropped silently
    /// * `Err(MalformedRecord)` - a required field is missing, empty, or unusable
    pub fn normalize(&self, payload: RawIssuePayload) -> Result<Normalized, MalformedRecord> {
        let value = payload.into_value();
        if !value.is_object() {
            return Err(MalformedRecord::NotAnObject(value.to_string()));
        }
        let fields: IssueFields = serde_json::from_value(value)
            .map_err(|e| MalformedRecord::NotAnObject(e.to_string()))?;

        let (owner, name) = derive_repository(&fields)?;
        let Some(repository) = self.registry.lookup(&owner, &name) else {
            return Ok(Normalized::Foreign(format!("{owner}/{name}")));
        };

        if let (Some(query), Some(labels)) = (&self.query, &fields.labels) {
            if !query.matches_any_label(labels.iter().map(LabelRef::name)) {
                return Ok(Normalized::Foreign(repository.full_name()));
            }
        }

        let title = required(fields.title, "title")?;
        let url = required(fields.html_url, "html_url")?;
        let created_at = calendar_date(&required(fields.created_at, "created_at")?)?;

        Ok(Normalized::Record(NormalizedIssueRecord {
            repository: repository.full_name(),
            title,
            url,
            created_at,
        }))
    }

    /// Normalize a page of payloads, tallying what was kept and dropped
    pub fn normalize_all(
        &self,
        source: &TargetRepository,
        payloads: Vec<RawIssuePayload>,
    ) -> (Vec<NormalizedIssueRecord>, NormalizationStats) {
        let mut stats = NormalizationStats {
            received: payloads.len(),
            ..NormalizationStats::default()
        };
        let mut records = Vec::with_capacity(payloads.len());

        for payload in payloads {
            match self.normalize(payload) {
                Ok(Normalized::Record(record)) => {
                    stats.accepted += 1;
                    records.push(record);
                }
                Ok(Normalized::Foreign(derived)) => {
                    stats.foreign += 1;
                    tracing::debug!(repository = %source, derived = %derived, "dropping issue outside registry or label filter");
                }
                Err(err) => {
                    stats.malformed += 1;
                    tracing::warn!(repository = %source, error = %err, "discarding malformed issue");
                }
            }
        }

        (records, stats)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, MalformedRecord> {
    match value {
        None => Err(MalformedRecord::MissingField(field)),
        Some(v) if v.trim().is_empty() => Err(MalformedRecord::EmptyField(field)),
        Some(v) => Ok(v),
    }
}

/// Take the calendar date as written, with no timezone conversion
///
/// Accepts RFC 3339 timestamps, then falls back to whatever precedes the first
/// `T` (offset-less timestamps, bare `YYYY-MM-DD` dates).
fn calendar_date(timestamp: &str) -> Result<NaiveDate, MalformedRecord> {
    let trimmed = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        // date_naive() on a FixedOffset datetime is the local (as-written) date
        return Ok(dt.date_naive());
    }
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| MalformedRecord::InvalidTimestamp(timestamp.to_string()))
}

/// Find `owner/name` in the payload's repository reference
///
/// Preference order: `repository_url`, then nested `repository.full_name`,
/// then nested `repository.url`.
fn derive_repository(fields: &IssueFields) -> Result<(String, String), MalformedRecord> {
    if let Some(reference) = fields.repository_url.as_deref().filter(|s| !s.trim().is_empty()) {
        return parse_repository_url(reference);
    }
    if let Some(repository) = &fields.repository {
        if let Some(full_name) = repository.full_name.as_deref() {
            return full_name
                .parse::<TargetRepository>()
                .map(|r| (r.owner().to_string(), r.name().to_string()))
                .map_err(|_| MalformedRecord::InvalidRepositoryReference(full_name.to_string()));
        }
        if let Some(reference) = repository.url.as_deref() {
            return parse_repository_url(reference);
        }
    }
    Err(MalformedRecord::MissingField("repository_url"))
}

/// Extract `owner/name` from an API resource URL such as
/// `https://api.github.com/repos/octo/demo`, or a web URL such as
/// `https://github.com/octo/demo`
pub fn parse_repository_url(reference: &str) -> Result<(String, String), MalformedRecord> {
    let invalid = || MalformedRecord::InvalidRepositoryReference(reference.to_string());

    let url = Url::parse(reference.trim()).map_err(|_| invalid())?;
    let segments: Vec<&str> = url
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|s| !s.is_empty())
        .collect();

    let pair = match segments.iter().position(|s| *s == "repos") {
        Some(i) if segments.len() == i + 3 => (segments[i + 1], segments[i + 2]),
        None if segments.len() == 2 => (segments[0], segments[1]),
        _ => return Err(invalid()),
    };

    let repository = TargetRepository::new(pair.0, pair.1).map_err(|_| invalid())?;
    Ok((repository.owner().to_string(), repository.name().to_string()))
}
