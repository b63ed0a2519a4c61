//! Transport configuration.
//!
//! [`FeedConfig`] holds the endpoint, API key and request tuning for the news
//! provider. It can be loaded from a YAML file and is then overridden by CLI
//! flags or environment variables in the binary.
//!
//! ```yaml
//! endpoint: https://newsdata.io/api/1/latest
//! api_key: pub_xxx
//! language: en
//! timeout_secs: 10
//! ```

use crate::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, instrument};
use url::Url;

/// Default search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://newsdata.io/api/1/latest";

/// Query used when the caller has not asked for anything specific.
pub const DEFAULT_QUERY: &str = "everything";

/// Configuration for the news transport.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Search endpoint, without query string.
    pub endpoint: String,
    /// Provider API key, sent as the `apikey` query parameter.
    pub api_key: String,
    /// Language filter applied to searches started without one.
    pub language: String,
    /// Query used when none is supplied.
    pub default_query: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Automatic retries per fetch for retryable errors. 0 disables retrying.
    pub max_retries: usize,
    /// First backoff delay in milliseconds; doubles per attempt.
    pub retry_base_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            language: "en".to_string(),
            default_query: DEFAULT_QUERY.to_string(),
            timeout_secs: 10,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("FeedConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &api_key)
            .field("language", &self.language)
            .field("default_query", &self.default_query)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .finish()
    }
}

impl FeedConfig {
    /// Config pointing at `endpoint` with `api_key`, defaults elsewhere.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Checks that a request can be issued with this configuration.
    ///
    /// # Errors
    ///
    /// [`FeedError::Configuration`] when the endpoint or key is blank, the
    /// endpoint is not an absolute URL, or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(FeedError::Configuration("endpoint is not set".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(FeedError::Configuration("api_key is not set".into()));
        }
        if let Err(e) = Url::parse(self.endpoint.trim()) {
            return Err(FeedError::Configuration(format!(
                "endpoint is not a valid URL: {e}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(FeedError::Configuration(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Load a [`FeedConfig`] from a YAML file. Missing keys take their defaults.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_config(path: impl AsRef<Path>) -> Result<FeedConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        FeedError::Configuration(format!("cannot read {}: {e}", path.display()))
    })?;
    let config: FeedConfig = serde_yaml::from_str(&raw).map_err(|e| {
        FeedError::Configuration(format!("cannot parse {}: {e}", path.display()))
    })?;
    info!(endpoint = %config.endpoint, language = %config.language, "Loaded configuration");
    Ok(config)
}
