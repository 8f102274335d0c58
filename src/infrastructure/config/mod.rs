//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Configuration validation
//! - Registry and query construction from validated config

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
