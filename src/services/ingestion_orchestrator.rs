//! Ingestion orchestration
//!
//! Visits every registered repository once, pacing requests through a shared
//! token bucket, and folds the results into an [`IngestionRun`]. A failing
//! repository becomes a recorded outcome; it never stops the others.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

use crate::domain::models::{
    IngestionRun, IssueQuery, NormalizedIssueRecord, RepositoryOutcome, RepositoryRegistry,
    TargetRepository,
};
use crate::domain::ports::IssueSource;
use crate::infrastructure::github::TokenBucketRateLimiter;
use crate::services::normalizer::ResponseNormalizer;

/// Drives the registry through an [`IssueSource`]
///
/// There is no retry and no backoff: each repository is attempted exactly
/// once per run.
pub struct IngestionOrchestrator {
    source: Arc<dyn IssueSource>,
    registry: Arc<RepositoryRegistry>,
    query: IssueQuery,
    normalizer: ResponseNormalizer,
    rate_limiter: TokenBucketRateLimiter,
    max_concurrent_fetches: usize,
}

impl IngestionOrchestrator {
    pub fn new(
        source: Arc<dyn IssueSource>,
        registry: Arc<RepositoryRegistry>,
        query: IssueQuery,
        rate_limiter: TokenBucketRateLimiter,
    ) -> Self {
        let normalizer =
            ResponseNormalizer::new(Arc::clone(&registry)).with_label_check(query.clone());
        Self {
            source,
            registry,
            query,
            normalizer,
            rate_limiter,
            max_concurrent_fetches: 1,
        }
    }

    /// Allow up to `limit` fetches in flight; the shared limiter still bounds the rate
    #[must_use]
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    /// Visit every repository once and collect the results
    ///
    /// Always completes: an empty registry or a run where every repository
    /// failed yields a run with no records.
    pub async fn run(&self) -> IngestionRun {
        let mut run = IngestionRun::start();
        let span = info_span!("ingestion_run", run_id = %run.id());

        async {
            info!(
                repositories = self.registry.len(),
                query = %self.query,
                concurrency = self.max_concurrent_fetches,
                "Starting ingestion run"
            );

            // `buffered` yields in registry order even when fetches overlap
            let mut visits = stream::iter(self.registry.iter())
                .map(|repository| self.visit(repository))
                .buffered(self.max_concurrent_fetches);

            while let Some((outcome, records)) = visits.next().await {
                run.absorb(outcome, records);
            }

            info!(
                records = run.record_count(),
                collapsed = run.collapsed_count(),
                failures = run.failure_count(),
                "Ingestion run complete"
            );
        }
        .instrument(span)
        .await;

        run
    }

    /// Fetch and normalize one repository, converting any failure into an outcome
    async fn visit(
        &self,
        repository: &TargetRepository,
    ) -> (RepositoryOutcome, Vec<NormalizedIssueRecord>) {
        self.rate_limiter.acquire().await;

        match self.source.fetch_issues(repository, &self.query).await {
            Ok(payloads) => {
                let (records, stats) = self.normalizer.normalize_all(repository, payloads);
                info!(
                    repository = %repository,
                    received = stats.received,
                    accepted = stats.accepted,
                    foreign = stats.foreign,
                    malformed = stats.malformed,
                    "Fetched issues"
                );
                (RepositoryOutcome::fetched(repository.clone(), stats), records)
            }
            Err(err) => {
                warn!(repository = %repository, error = %err, "Failed to fetch issues");
                (RepositoryOutcome::failed(repository.clone(), err.to_string()), Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::FetchError;
    use crate::domain::models::{RawIssuePayload, SourceOutcome};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Canned responses per repository, recording the order of calls
    #[derive(Default)]
    struct StubSource {
        pages: HashMap<String, Vec<serde_json::Value>>,
        failures: HashMap<String, StatusCode>,
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl StubSource {
        fn page(mut self, repo: &str, items: Vec<serde_json::Value>) -> Self {
            self.pages.insert(repo.to_string(), items);
            self
        }

        fn failing(mut self, repo: &str, status: StatusCode) -> Self {
            self.failures.insert(repo.to_string(), status);
            self
        }

        fn call_order(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
        }
    }

    #[async_trait]
    impl IssueSource for StubSource {
        async fn fetch_issues(
            &self,
            repository: &TargetRepository,
            _query: &IssueQuery,
        ) -> Result<Vec<RawIssuePayload>, FetchError> {
            let key = repository.to_string();
            self.calls.lock().unwrap().push((key.clone(), Instant::now()));
            if let Some(status) = self.failures.get(&key) {
                return Err(FetchError::from_status(*status, "stub failure".to_string()));
            }
            Ok(self
                .pages
                .get(&key)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(RawIssuePayload::new)
                .collect())
        }
    }

    fn issue(repo: &str, number: u32, date: &str) -> serde_json::Value {
        json!({
            "title": format!("Issue {number}"),
            "html_url": format!("https://github.com/{repo}/issues/{number}"),
            "created_at": format!("{date}T12:00:00Z"),
            "repository_url": format!("https://api.github.com/repos/{repo}"),
            "labels": [{"name": "good first issue"}]
        })
    }

    fn orchestrator(source: Arc<StubSource>, repos: &[&str], rps: f64) -> IngestionOrchestrator {
        IngestionOrchestrator::new(
            source,
            Arc::new(RepositoryRegistry::parse(repos).unwrap()),
            IssueQuery::new(["good first issue", "help wanted"]).unwrap(),
            TokenBucketRateLimiter::new(rps, 1),
        )
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let source = Arc::new(
            StubSource::default()
                .failing("a/a", StatusCode::INTERNAL_SERVER_ERROR)
                .page("b/b", vec![issue("b/b", 1, "2024-01-01"), issue("b/b", 2, "2024-01-02")]),
        );
        let run = orchestrator(Arc::clone(&source), &["a/a", "b/b"], 1000.0).run().await;

        assert_eq!(run.outcomes().len(), 2);
        assert_eq!(run.failure_count(), 1);
        assert!(matches!(
            &run.outcomes()[0].outcome,
            SourceOutcome::Failed { reason } if reason.contains("500")
        ));
        assert!(run.records().all(|r| r.repository == "b/b"));
        assert_eq!(run.record_count(), 2);
    }

    #[tokio::test]
    async fn test_all_failing_is_a_valid_empty_run() {
        let source = Arc::new(
            StubSource::default()
                .failing("a/a", StatusCode::NOT_FOUND)
                .failing("b/b", StatusCode::UNAUTHORIZED),
        );
        let run = orchestrator(source, &["a/a", "b/b"], 1000.0).run().await;

        assert_eq!(run.failure_count(), 2);
        assert_eq!(run.record_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let source = Arc::new(StubSource::default());
        let run = orchestrator(Arc::clone(&source), &[], 1000.0).run().await;

        assert!(run.outcomes().is_empty());
        assert_eq!(run.record_count(), 0);
        assert!(source.call_order().is_empty());
    }

    #[tokio::test]
    async fn test_each_repository_visited_once_in_registry_order() {
        let source = Arc::new(StubSource::default());
        orchestrator(Arc::clone(&source), &["c/c", "a/a", "b/b"], 1000.0)
            .run()
            .await;

        assert_eq!(source.call_order(), vec!["c/c", "a/a", "b/b"]);
    }

    #[tokio::test]
    async fn test_duplicate_urls_collapse_across_repositories() {
        // b/b's page cross-lists an a/a issue
        let source = Arc::new(
            StubSource::default()
                .page("a/a", vec![issue("a/a", 1, "2024-01-01")])
                .page("b/b", vec![issue("a/a", 1, "2024-01-01"), issue("b/b", 7, "2024-01-03")]),
        );
        let run = orchestrator(source, &["a/a", "b/b"], 1000.0).run().await;

        assert_eq!(run.record_count(), 2);
        assert_eq!(run.collapsed_count(), 1);
    }

    #[tokio::test]
    async fn test_foreign_and_malformed_items_are_tallied() {
        let mut untitled = issue("a/a", 3, "2024-01-01");
        untitled.as_object_mut().unwrap().remove("title");
        let source = Arc::new(StubSource::default().page(
            "a/a",
            vec![issue("a/a", 1, "2024-01-01"), issue("z/z", 2, "2024-01-01"), untitled],
        ));
        let run = orchestrator(source, &["a/a"], 1000.0).run().await;

        match &run.outcomes()[0].outcome {
            SourceOutcome::Fetched { stats } => {
                assert_eq!(stats.received, 3);
                assert_eq!(stats.accepted, 1);
                assert_eq!(stats.foreign, 1);
                assert_eq!(stats.malformed, 1);
            }
            other => panic!("expected fetched outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_requests_are_paced_between_repositories() {
        let source = Arc::new(StubSource::default());
        orchestrator(Arc::clone(&source), &["a/a", "b/b", "c/c"], 10.0)
            .run()
            .await;

        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            let gap = pair[1].1.duration_since(pair[0].1);
            assert!(gap >= Duration::from_millis(90), "calls only {gap:?} apart");
        }
    }

    #[tokio::test]
    async fn test_concurrent_fetches_keep_order_and_pacing() {
        let source = Arc::new(
            StubSource::default()
                .page("a/a", vec![issue("a/a", 1, "2024-01-01")])
                .failing("b/b", StatusCode::BAD_GATEWAY)
                .page("c/c", vec![issue("c/c", 1, "2024-01-01")]),
        );
        let start = Instant::now();
        let run = orchestrator(Arc::clone(&source), &["a/a", "b/b", "c/c"], 10.0)
            .with_max_concurrent_fetches(3)
            .run()
            .await;

        assert!(start.elapsed() >= Duration::from_millis(180));
        let order: Vec<String> = run.outcomes().iter().map(|o| o.repository.to_string()).collect();
        assert_eq!(order, vec!["a/a", "b/b", "c/c"]);
        assert_eq!(run.failure_count(), 1);
        assert_eq!(run.record_count(), 2);
    }
}
