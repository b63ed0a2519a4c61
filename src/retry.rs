//! Exponential backoff around any [`NewsTransport`].
//!
//! [`RetryTransport`] re-issues a page request when the error is retryable
//! (network failures, timeouts, HTTP 429 and 5xx). Configuration errors and
//! other provider rejections are returned immediately.
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=250ms)
//! ```
//!
//! The feed only sees the final outcome, so `loading` stays true across
//! attempts.

use crate::config::FeedConfig;
use crate::error::Result;
use crate::models::Page;
use crate::transport::{NewsTransport, PageRequest};
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Decorator that adds backoff retries to a transport.
pub struct RetryTransport<T> {
    /// The wrapped transport.
    inner: T,
    /// Retries after the first attempt.
    max_retries: usize,
    /// First backoff delay; doubles each attempt.
    base_delay: Duration,
    /// Upper bound on the exponential part of the delay.
    max_delay: Duration,
}

impl<T> RetryTransport<T>
where
    T: NewsTransport,
{
    /// Wrap `inner` with up to `max_retries` retries.
    ///
    /// ```ignore
    /// let client = NewsDataClient::new(config)?;
    /// let transport = RetryTransport::new(client, 2, Duration::from_millis(500));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    /// Retry settings taken from `config`.
    pub fn from_config(inner: T, config: &FeedConfig) -> Self {
        Self::new(
            inner,
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
        )
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for RetryTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryTransport")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

/// Exponential part of the delay before retry number `attempt` (1-based).
pub fn backoff_delay(base: Duration, max: Duration, attempt: usize) -> Duration {
    let shift = attempt.saturating_sub(1).min(31) as u32;
    base.saturating_mul(1u32 << shift).min(max)
}

impl<T> NewsTransport for RetryTransport<T>
where
    T: NewsTransport,
{
    #[instrument(level = "info", skip_all, fields(query = %request.query))]
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch_page(request).await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64;
                    let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

                    if !e.is_retryable() {
                        return Err(e);
                    }
                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_attempt,
                                elapsed_ms_total,
                                error = %e,
                                "fetch_page() exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = backoff_delay(self.base_delay, self.max_delay, attempt)
                        + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "fetch_page() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
