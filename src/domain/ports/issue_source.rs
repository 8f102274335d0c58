use async_trait::async_trait;

use crate::domain::error::FetchError;
use crate::domain::models::{IssueQuery, RawIssuePayload, TargetRepository};

/// Source of issue listings for a single repository
///
/// One call performs at most one upstream request and returns a single page.
/// Implementations must not retry; the orchestrator treats every error as a
/// failure of that repository only.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetch one page of issues matching `query` from `repository`
    ///
    /// # Returns
    /// * `Ok(Vec<RawIssuePayload>)` - Zero or more unvalidated issues
    /// * `Err(FetchError)` - Transport failure, timeout, or non-2xx status
    async fn fetch_issues(
        &self,
        repository: &TargetRepository,
        query: &IssueQuery,
    ) -> Result<Vec<RawIssuePayload>, FetchError>;
}
