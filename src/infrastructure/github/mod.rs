pub mod client;
pub mod rate_limiter;

pub use client::{GitHubClient, GitHubClientConfig};
pub use rate_limiter::TokenBucketRateLimiter;
