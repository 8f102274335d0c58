use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::query::{IssueState, SortDirection, SortField, DEFAULT_PAGE_SIZE};

/// Main configuration structure for issue-finder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Repositories to visit, as `owner/name`, in visiting order
    #[serde(default = "default_repositories")]
    pub repositories: Vec<String>,

    /// Issue-list query parameters
    #[serde(default)]
    pub query: QueryConfig,

    /// GitHub API client configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Orchestration configuration
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Snapshot output configuration
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// README updater configuration
    #[serde(default)]
    pub readme: ReadmeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_repositories() -> Vec<String> {
    [
        "microsoft/vscode",
        "facebook/react",
        "tensorflow/tensorflow",
        "kubernetes/kubernetes",
        "flutter/flutter",
        "godotengine/godot",
        "firstcontributions/first-contributions",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repositories: default_repositories(),
            query: QueryConfig::default(),
            github: GitHubConfig::default(),
            rate_limit: RateLimitConfig::default(),
            ingestion: IngestionConfig::default(),
            snapshot: SnapshotConfig::default(),
            readme: ReadmeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Issue-list query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueryConfig {
    #[serde(default)]
    pub state: IssueState,

    /// Issues must carry at least one of these labels
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    #[serde(default)]
    pub sort: SortField,

    #[serde(default)]
    pub direction: SortDirection,

    /// Results per repository (a single page is fetched)
    #[serde(default = "default_per_page")]
    pub per_page: u8,
}

fn default_labels() -> Vec<String> {
    vec!["good first issue".to_string(), "help wanted".to_string()]
}

const fn default_per_page() -> u8 {
    DEFAULT_PAGE_SIZE
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            state: IssueState::default(),
            labels: default_labels(),
            sort: SortField::default(),
            direction: SortDirection::default(),
            per_page: default_per_page(),
        }
    }
}

/// GitHub API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_token_env() -> String {
    "GH_TOKEN".to_string()
}

fn default_user_agent() -> String {
    concat!("issue-finder/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token_env: default_token_env(),
            user_agent: default_user_agent(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed across all repositories
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

const fn default_requests_per_second() -> f64 {
    1.0
}

const fn default_burst_size() -> u32 {
    1
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestionConfig {
    /// Fetches allowed in flight at once; 1 visits repositories strictly in turn
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

const fn default_max_concurrent_fetches() -> usize {
    1
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

/// Snapshot output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("issues.csv")
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

/// README updater configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReadmeConfig {
    #[serde(default = "default_readme_path")]
    pub path: PathBuf,

    #[serde(default = "default_start_marker")]
    pub start_marker: String,

    #[serde(default = "default_end_marker")]
    pub end_marker: String,

    /// Text placed between the markers when the snapshot has no rows
    #[serde(default = "default_empty_message")]
    pub empty_message: String,
}

fn default_readme_path() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_start_marker() -> String {
    "<!-- ISSUES:START -->".to_string()
}

fn default_end_marker() -> String {
    "<!-- ISSUES:END -->".to_string()
}

fn default_empty_message() -> String {
    "No open issues found today.".to_string()
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            path: default_readme_path(),
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
            empty_message: default_empty_message(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation for file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
