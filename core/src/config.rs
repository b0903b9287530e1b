//! Client configuration: credentials, endpoint, and timeout.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.markup.ai/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_TOKEN: &str = "MARKUPAI_API_TOKEN";
pub const ENV_BASE_URL: &str = "MARKUPAI_BASE_URL";
pub const ENV_TIMEOUT: &str = "MARKUPAI_TIMEOUT";

/// Immutable settings shared by every request a client makes.
///
/// The base URL is stored without a trailing slash so that paths can be
/// joined with a single `/`.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    token: String,
    base_url: String,
    timeout_seconds: u64,
}

impl Configuration {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Read `MARKUPAI_API_TOKEN`, `MARKUPAI_BASE_URL` and `MARKUPAI_TIMEOUT`.
    ///
    /// Only the token is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup(ENV_TOKEN)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::generic(format!("{ENV_TOKEN} is not set")))?;
        let mut config = Self::new(token);

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|u| !u.is_empty()) {
            config = config.with_base_url(&base_url);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT).filter(|t| !t.is_empty()) {
            let seconds = raw.trim().parse::<u64>().map_err(|e| {
                Error::generic(format!("{ENV_TIMEOUT} must be a whole number of seconds, got {raw:?}"))
                    .with_source(e)
            })?;
            config = config.with_timeout(seconds);
        }
        Ok(config)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Value of the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// Keeps the token out of logs.
impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}
