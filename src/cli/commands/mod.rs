//! CLI command implementations.

pub mod fetch;
pub mod readme;
pub mod repos;
