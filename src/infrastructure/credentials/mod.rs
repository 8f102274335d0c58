//! Credentials management infrastructure
//!
//! The API token is read from the process environment and kept behind a type
//! that never prints its value.

use std::fmt;

use crate::domain::error::CredentialError;

/// Variable consulted when the configured one is unset
pub const FALLBACK_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// A GitHub API token
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A log-safe rendering showing at most the first four characters
    pub fn redacted(&self) -> String {
        if self.0.len() > 8 && self.0.is_char_boundary(4) {
            format!("{}...[REDACTED]", &self.0[..4])
        } else {
            "[REDACTED]".to_string()
        }
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&"[REDACTED]").finish()
    }
}

/// Load the token from `primary_var`, falling back to [`FALLBACK_TOKEN_ENV`]
///
/// Blank values count as unset.
pub fn load_token(primary_var: &str) -> Result<ApiToken, CredentialError> {
    [primary_var, FALLBACK_TOKEN_ENV]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .map(ApiToken)
        .ok_or_else(|| CredentialError::Missing(primary_var.to_string()))
}
