//! HTTP transport for the news search endpoint.
//!
//! [`NewsTransport`] is the seam between the feed and the network: one call,
//! one page. [`NewsDataClient`] implements it against the newsdata-style API:
//!
//! ```text
//! GET {endpoint}?apikey={key}&q={query}&language={lang}[&page={cursor}]
//! ```
//!
//! # Error resolution
//!
//! A non-2xx status, or a JSON payload with `"status": "error"`, becomes a
//! [`FeedError::Provider`] whose message is the first of:
//!
//! 1. nested `results.message` (or `error.message`)
//! 2. top-level `message` (or `error` when it is a string)
//! 3. a fixed rate-limit message for HTTP 429
//! 4. `Request failed with status {code} {reason}`
//!
//! Bodies are only parsed when the response declares a JSON content type.

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::models::{NewsDataResponse, Page};
use crate::normalize::normalize_response;
use crate::utils::truncate_for_log;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Message used for HTTP 429 when the provider gave none.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests: the news API rate limit was reached. Please try again later.";

/// Parameters of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub language: String,
    /// Cursor from the previous page; `None` requests the first page.
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn first(query: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: language.into(),
            cursor: None,
        }
    }
}

/// Something that can fetch one normalized page of results.
pub trait NewsTransport {
    /// Perform one request and normalize its results.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page>;
}

/// [`NewsTransport`] backed by `reqwest`.
#[derive(Clone)]
pub struct NewsDataClient {
    client: reqwest::Client,
    config: FeedConfig,
}

impl fmt::Debug for NewsDataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsDataClient")
            .field("endpoint", &self.config.endpoint)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl NewsDataClient {
    /// Build a client. Configuration is checked per request, not here, so a
    /// client without a key can be constructed and fails on first use.
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// The full request URL, API key included. Do not log it.
    pub fn request_url(&self, request: &PageRequest) -> Result<Url> {
        let mut params: Vec<(&str, &str)> = vec![
            ("apikey", self.config.api_key.trim()),
            ("q", request.query.as_str()),
        ];
        if !request.language.trim().is_empty() {
            params.push(("language", request.language.as_str()));
        }
        if let Some(cursor) = request.cursor.as_deref() {
            params.push(("page", cursor));
        }
        Url::parse_with_params(self.config.endpoint.trim(), &params)
            .map_err(|e| FeedError::Configuration(format!("endpoint is not a valid URL: {e}")))
    }
}

impl NewsTransport for NewsDataClient {
    #[instrument(
        level = "info",
        skip_all,
        fields(query = %request.query, language = %request.language, has_cursor = request.cursor.is_some())
    )]
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page> {
        self.config.validate()?;
        let url = self.request_url(request)?;

        let t0 = Instant::now();
        debug!(endpoint = %self.config.endpoint, "Sending news request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);
        let body = response.bytes().await?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        let payload: Option<Value> = if is_json {
            match serde_json::from_slice(&body) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(error = %e, body = %truncate_for_log(&String::from_utf8_lossy(&body), 300), "Unparseable JSON body");
                    None
                }
            }
        } else {
            None
        };

        if !status.is_success() || has_error_marker(payload.as_ref()) {
            let message = resolve_error_message(status, payload.as_ref());
            warn!(status = status.as_u16(), %message, elapsed_ms, "Provider rejected request");
            return Err(FeedError::provider(Some(status.as_u16()), message));
        }

        let Some(payload) = payload else {
            return Err(FeedError::provider(
                Some(status.as_u16()),
                "Unexpected response from news provider: expected a JSON payload",
            ));
        };
        let decoded: NewsDataResponse = serde_json::from_value(payload).map_err(|e| {
            FeedError::provider(
                Some(status.as_u16()),
                format!("Unexpected response from news provider: {e}"),
            )
        })?;

        let page = normalize_response(decoded);
        info!(
            count = page.articles.len(),
            total_results = ?page.total_results,
            has_more = page.next_page.is_some(),
            elapsed_ms,
            "Fetched page"
        );
        Ok(page)
    }
}

fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

fn has_error_marker(payload: Option<&Value>) -> bool {
    payload
        .and_then(|p| p.get("status"))
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("error"))
}

/// Pick the user-facing message for a failed response.
pub fn resolve_error_message(status: StatusCode, payload: Option<&Value>) -> String {
    let nested = payload.and_then(|p| {
        p.pointer("/results/message")
            .or_else(|| p.pointer("/error/message"))
    });
    let top_level = payload.and_then(|p| p.get("message").or_else(|| p.get("error")));

    let provider_message = [nested, top_level]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|m| !m.is_empty());
    if let Some(message) = provider_message {
        return message.to_string();
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return RATE_LIMIT_MESSAGE.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("Request failed with status {} {}", status.as_u16(), reason),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}
