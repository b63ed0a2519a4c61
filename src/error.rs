//! Error taxonomy for feed fetches.
//!
//! Every failure a fetch can produce ends up as one of three kinds. None of
//! them escape [`NewsFeed`](crate::feed::NewsFeed): they are folded into the
//! `error` field of [`FeedState`](crate::feed::FeedState) as a display string.
//! No API keys appear in any message.

/// Errors produced while configuring or performing a news fetch.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Required transport settings are missing or malformed. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Non-success HTTP status, an explicit error envelope, or a timeout.
    ///
    /// Displays as the resolved provider message with no prefix.
    #[error("{message}")]
    Provider {
        /// HTTP status, when one was received.
        status: Option<u16>,
        /// Provider-derived or status-derived message.
        message: String,
    },

    /// Transport-level failure (connection refused, DNS, TLS, ...).
    #[error("network error: {0}")]
    Network(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, FeedError>;

impl FeedError {
    /// Builds a [`FeedError::Provider`].
    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        FeedError::Provider {
            status,
            message: message.into(),
        }
    }

    /// Whether an automatic retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Configuration(_) => false,
            FeedError::Network(_) => true,
            // status None is a timeout
            FeedError::Provider { status, .. } => match status {
                None => true,
                Some(code) => *code == 429 || (500..600).contains(code),
            },
        }
    }
}

/// The request URL carries the API key, so it is stripped before formatting.
impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::provider(None, "request timed out")
        } else {
            FeedError::Network(err.without_url().to_string())
        }
    }
}
