//! Infrastructure layer module
//!
//! This module contains all infrastructure adapters and external integrations:
//! - GitHub API client and the shared rate limiter
//! - Configuration management
//! - Credentials management
//! - Logging infrastructure
//! - Snapshot persistence
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod credentials;
pub mod github;
pub mod logging;
pub mod snapshot;
