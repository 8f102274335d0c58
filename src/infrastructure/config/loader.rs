use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::{IssueQuery, RepositoryRegistry, TargetRepository, MAX_PAGE_SIZE};

/// Project configuration directory
pub const CONFIG_DIR: &str = ".issue-finder";

/// Prefix for environment overrides; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "ISSUE_FINDER_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid repository '{0}'. Must be of the form owner/name")]
    InvalidRepository(String),

    #[error("Label filter cannot be empty")]
    EmptyLabels,

    #[error("Label names cannot be blank")]
    BlankLabel,

    #[error("Invalid per_page: {0}. Must be between 1 and {MAX_PAGE_SIZE}")]
    InvalidPageSize(u8),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error("Invalid timeout_secs: {0}. Must be between 1 and 300")]
    InvalidTimeout(u64),

    #[error("Invalid max_concurrent_fetches: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    #[error("GitHub base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Token environment variable name cannot be empty")]
    EmptyTokenEnv,

    #[error("Snapshot path cannot be empty")]
    EmptySnapshotPath,

    #[error("README markers must be non-empty and distinct")]
    InvalidMarkers,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .issue-finder/config.yaml (project config)
    /// 3. .issue-finder/local.yaml (local overrides, optional)
    /// 4. Environment variables (ISSUE_FINDER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(Path::new(CONFIG_DIR).join("config.yaml")))
            .merge(Yaml::file(Path::new(CONFIG_DIR).join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        for id in &config.repositories {
            id.parse::<TargetRepository>()
                .map_err(|_| ConfigError::InvalidRepository(id.clone()))?;
        }

        // Validate query
        if config.query.labels.is_empty() {
            return Err(ConfigError::EmptyLabels);
        }
        if config.query.labels.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::BlankLabel);
        }
        if config.query.per_page == 0 || config.query.per_page > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize(config.query.per_page));
        }

        // Validate GitHub client
        if config.github.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if config.github.timeout_secs == 0 || config.github.timeout_secs > 300 {
            return Err(ConfigError::InvalidTimeout(config.github.timeout_secs));
        }
        if config.github.token_env.trim().is_empty() {
            return Err(ConfigError::EmptyTokenEnv);
        }

        // Validate rate_limit
        if config.rate_limit.requests_per_second <= 0.0
            || !config.rate_limit.requests_per_second.is_finite()
        {
            return Err(ConfigError::InvalidRateLimit(
                config.rate_limit.requests_per_second,
            ));
        }
        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.rate_limit.burst_size));
        }

        if config.ingestion.max_concurrent_fetches == 0 {
            return Err(ConfigError::InvalidConcurrency(
                config.ingestion.max_concurrent_fetches,
            ));
        }

        if config.snapshot.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptySnapshotPath);
        }

        let readme = &config.readme;
        if readme.start_marker.is_empty()
            || readme.end_marker.is_empty()
            || readme.start_marker == readme.end_marker
        {
            return Err(ConfigError::InvalidMarkers);
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }

    /// Build the repository registry from a validated config
    pub fn registry(config: &Config) -> Result<RepositoryRegistry, ConfigError> {
        RepositoryRegistry::parse(&config.repositories)
            .map_err(|e| ConfigError::InvalidRepository(e.0))
    }

    /// Build the issue query from a validated config
    pub fn query(config: &Config) -> Result<IssueQuery, ConfigError> {
        let q = &config.query;
        let query = IssueQuery::new(q.labels.iter().cloned())
            .map_err(|_| ConfigError::EmptyLabels)?
            .with_state(q.state)
            .with_sort(q.sort, q.direction)
            .with_page_size(q.per_page)
            .map_err(|_| ConfigError::InvalidPageSize(q.per_page))?;
        Ok(query)
    }
}
