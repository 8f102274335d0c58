use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::issue::NormalizedIssueRecord;
use super::repository::TargetRepository;

/// Per-item tallies from normalizing one repository's page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationStats {
    /// Items returned by the upstream
    pub received: usize,
    /// Items that became records
    pub accepted: usize,
    /// Items attributed to a repository outside the registry, or matching no label
    pub foreign: usize,
    /// Items missing or carrying an unusable required field
    pub malformed: usize,
}

/// What happened when one repository was visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Fetched { stats: NormalizationStats },
    Failed { reason: String },
}

/// Tagged result for one repository in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryOutcome {
    pub repository: TargetRepository,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

impl RepositoryOutcome {
    pub const fn fetched(repository: TargetRepository, stats: NormalizationStats) -> Self {
        Self {
            repository,
            outcome: SourceOutcome::Fetched { stats },
        }
    }

    pub fn failed(repository: TargetRepository, reason: impl Into<String>) -> Self {
        Self {
            repository,
            outcome: SourceOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Failed { .. })
    }
}

/// The result of one pass over the registry
///
/// Records are keyed by url; inserting a record whose url is already present
/// replaces the earlier one.
#[derive(Debug, Clone)]
pub struct IngestionRun {
    id: Uuid,
    started_at: DateTime<Utc>,
    outcomes: Vec<RepositoryOutcome>,
    records: HashMap<String, NormalizedIssueRecord>,
    collapsed: usize,
}

impl IngestionRun {
    pub fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
            records: HashMap::new(),
            collapsed: 0,
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Record a repository outcome along with the records it produced
    pub fn absorb(&mut self, outcome: RepositoryOutcome, records: Vec<NormalizedIssueRecord>) {
        for record in records {
            if self.records.insert(record.url.clone(), record).is_some() {
                self.collapsed += 1;
            }
        }
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[RepositoryOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &RepositoryOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of records dropped because a later record shared their url
    pub const fn collapsed_count(&self) -> usize {
        self.collapsed
    }

    pub fn records(&self) -> impl Iterator<Item = &NormalizedIssueRecord> {
        self.records.values()
    }

    /// Consume the run, yielding its deduplicated records in no particular order
    pub fn into_records(self) -> Vec<NormalizedIssueRecord> {
        self.records.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, title: &str) -> NormalizedIssueRecord {
        NormalizedIssueRecord {
            repository: "octo/demo".to_string(),
            title: title.to_string(),
            url: url.to_string(),
            created_at: "2024-03-01".parse().unwrap(),
        }
    }

    #[test]
    fn test_same_url_collapses_last_seen_wins() {
        let repo: TargetRepository = "octo/demo".parse().unwrap();
        let mut run = IngestionRun::start();
        run.absorb(
            RepositoryOutcome::fetched(repo.clone(), NormalizationStats::default()),
            vec![record("https://x/1", "first"), record("https://x/2", "other")],
        );
        run.absorb(
            RepositoryOutcome::fetched(repo, NormalizationStats::default()),
            vec![record("https://x/1", "second")],
        );

        assert_eq!(run.record_count(), 2);
        assert_eq!(run.collapsed_count(), 1);
        let kept = run.records().find(|r| r.url == "https://x/1").unwrap();
        assert_eq!(kept.title, "second");
    }

    #[test]
    fn test_failures_are_kept_alongside_successes() {
        let mut run = IngestionRun::start();
        run.absorb(RepositoryOutcome::failed("a/a".parse().unwrap(), "boom"), vec![]);
        run.absorb(
            RepositoryOutcome::fetched("b/b".parse().unwrap(), NormalizationStats::default()),
            vec![record("https://x/1", "ok")],
        );

        assert_eq!(run.outcomes().len(), 2);
        assert_eq!(run.failure_count(), 1);
        assert_eq!(run.failures().next().unwrap().repository.to_string(), "a/a");
        assert_eq!(run.into_records().len(), 1);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = RepositoryOutcome::failed("a/a".parse().unwrap(), "HTTP 500");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["repository"], "a/a");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "HTTP 500");
    }
}
