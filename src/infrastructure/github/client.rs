use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient, Response};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::{CredentialError, FetchError};
use crate::domain::models::{GitHubConfig, IssueQuery, RawIssuePayload, TargetRepository};
use crate::domain::ports::IssueSource;
use crate::infrastructure::credentials::ApiToken;

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Longest error body kept in a failure reason
const MAX_ERROR_BODY: usize = 512;

/// Configuration for the GitHub HTTP client
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// API token sent as a bearer credential
    pub token: ApiToken,

    /// Base URL for the GitHub REST API
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header (GitHub rejects requests without one)
    pub user_agent: String,
}

impl GitHubClientConfig {
    pub fn from_config(config: &GitHubConfig, token: ApiToken) -> Self {
        Self {
            token,
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP client for the GitHub issues endpoint
///
/// One call is one GET for one page; there is no retry and no pagination.
/// Pacing belongs to the caller, which shares one limiter across all calls.
pub struct GitHubClient {
    http_client: ReqwestClient,
    base_url: String,
    timeout_secs: u64,
}

impl GitHubClient {
    /// Create a new GitHub API client
    ///
    /// # Returns
    /// * `Err(CredentialError)` if the token cannot be used as a header value
    /// * `Err(FetchError::Network)` if the HTTP client cannot be built
    pub fn new(config: GitHubClientConfig) -> anyhow::Result<Self> {
        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            token = %config.token.redacted(),
            "Initializing GitHub API client"
        );

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token.expose()))
            .map_err(|_| CredentialError::InvalidHeaderValue("the configured token variable".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT_GITHUB_JSON));
        headers.insert(API_VERSION_HEADER, header::HeaderValue::from_static(API_VERSION));

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .user_agent(config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// URL of the issue-list endpoint for one repository
    pub fn issues_url(&self, repository: &TargetRepository) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.base_url,
            repository.owner(),
            repository.name()
        )
    }

    fn classify_transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else {
            FetchError::Network(err)
        }
    }

    /// Handle HTTP response and convert to raw payloads
    async fn handle_response(&self, response: Response) -> Result<Vec<RawIssuePayload>, FetchError> {
        let status = response.status();
        debug!(%status, "Response status");

        if !status.is_success() {
            let mut body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            warn!(%status, body = %body, "GitHub API error");
            return Err(FetchError::from_status(status, body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify_transport_error(e))?;
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

        extract_items(body)
    }
}

#[async_trait]
impl IssueSource for GitHubClient {
    #[instrument(skip_all, fields(repository = %repository))]
    async fn fetch_issues(
        &self,
        repository: &TargetRepository,
        query: &IssueQuery,
    ) -> Result<Vec<RawIssuePayload>, FetchError> {
        let url = self.issues_url(repository);
        debug!(%url, %query, "GET issues");

        let response = self
            .http_client
            .get(&url)
            .query(&query.query_pairs())
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let items = self.handle_response(response).await?;
        debug!(count = items.len(), "Received issues");
        Ok(items)
    }
}

/// Accept a bare array (issues API) or an object with `items` (search API)
fn extract_items(body: serde_json::Value) -> Result<Vec<RawIssuePayload>, FetchError> {
    match body {
        serde_json::Value::Array(items) => Ok(items.into_iter().map(RawIssuePayload::new).collect()),
        serde_json::Value::Object(mut map) => match map.remove("items") {
            Some(serde_json::Value::Array(items)) => {
                Ok(items.into_iter().map(RawIssuePayload::new).collect())
            }
            _ => Err(FetchError::UnexpectedShape(
                "object without an 'items' array".to_string(),
            )),
        },
        other => Err(FetchError::UnexpectedShape(format!(
            "expected array, got {}",
            json_kind(&other)
        ))),
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn truncate_at_char_boundary(s: &mut String, max_len: usize) {
    if s.len() <= max_len {
        return;
    }
    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
    s.push_str("...");
}
