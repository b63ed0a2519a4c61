//! Query controller and feed state.
//!
//! [`FeedState`] is a plain value holding everything a display layer needs:
//! the accumulated articles plus `loading`, `error` and `has_more`. The
//! controller half of its API decides whether a request starts a new session
//! (hard reset) or continues the current one (load-more), and hands back a
//! [`FetchTicket`] describing the fetch to perform.
//!
//! Every ticket carries a monotonically increasing token. Only the ticket
//! issued last may complete; anything older is discarded on arrival without
//! touching the state, so a slow response for an abandoned query never
//! overwrites a newer search.
//!
//! ```text
//!            begin_*            complete(Ok)
//!   Idle ───────────► Loading ─────────────► Ready ──┐
//!                       ▲  │  complete(Err)          │ begin_*
//!                       │  └─────────────► Errored ──┤
//!                       └────────────────────────────┘
//! ```
//!
//! [`NewsFeed`] wraps a state and a [`NewsTransport`] into the async
//! `start_search` / `load_more` interface.

use crate::error::Result;
use crate::merge::{apply_failure, apply_success};
use crate::models::{Article, Page};
use crate::transport::{NewsTransport, PageRequest};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    /// No fetch attempted yet.
    #[default]
    Idle,
    Loading,
    Ready,
    Errored,
}

/// Accumulated results and status flags for one query session.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub(crate) articles: Vec<Article>,
    pub(crate) query: Option<String>,
    pub(crate) language: String,
    pub(crate) cursor: Option<String>,
    pub(crate) page: u32,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) has_more: bool,
    pub(crate) status: FeedStatus,
    pub(crate) latest_token: u64,
}

/// A fetch the controller has accepted, tagged with the session identity at
/// dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    token: u64,
    query: String,
    language: String,
    page: u32,
    cursor: Option<String>,
}

impl FetchTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// 1-based page number within the session.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Page 1 results replace the feed rather than extend it.
    pub fn is_new_search(&self) -> bool {
        self.page <= 1
    }

    /// The transport request for this ticket.
    pub fn to_request(&self) -> PageRequest {
        PageRequest {
            query: self.query.clone(),
            language: self.language.clone(),
            cursor: self.cursor.clone(),
        }
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// The active query, `None` before the first search.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Provider cursor for the next page.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Pages merged in the current session.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    /// Whether `(query, language)` names a different session than the current one.
    pub fn is_new_session(&self, query: &str, language: &str) -> bool {
        self.query.as_deref() != Some(query) || self.language != language
    }

    /// Route a `(query, page, language)` request.
    ///
    /// A different query or language, or `page <= 1`, starts a new session at
    /// page 1 regardless of the requested page. Otherwise the request is a
    /// load-more and is refused (`None`) unless a cursor is held and nothing
    /// is in flight.
    pub fn begin_request(&mut self, query: &str, page: u32, language: &str) -> Option<FetchTicket> {
        if page <= 1 || self.is_new_session(query, language) {
            return Some(self.begin_search(query, language));
        }
        self.begin_load_more()
    }

    /// Hard-reset to a new session and issue its page-1 ticket.
    ///
    /// Any fetch still in flight becomes stale.
    pub fn begin_search(&mut self, query: &str, language: &str) -> FetchTicket {
        self.articles.clear();
        self.query = Some(query.to_string());
        self.language = language.to_string();
        self.cursor = None;
        self.page = 0;
        self.has_more = false;
        self.issue(1, None)
    }

    /// Issue a ticket for the next page of the current session.
    ///
    /// Returns `None`, leaving the state untouched, when there is no session,
    /// a fetch is in flight, or no cursor is held.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if self.loading {
            debug!("Load-more refused: fetch already in flight");
            return None;
        }
        if self.query.is_none() || !self.has_more {
            debug!("Load-more refused: no further pages");
            return None;
        }
        let cursor = self.cursor.clone()?;
        Some(self.issue(self.page + 1, Some(cursor)))
    }

    fn issue(&mut self, page: u32, cursor: Option<String>) -> FetchTicket {
        self.latest_token += 1;
        self.loading = true;
        self.error = None;
        self.status = FeedStatus::Loading;

        FetchTicket {
            token: self.latest_token,
            query: self.query.clone().unwrap_or_default(),
            language: self.language.clone(),
            page,
            cursor,
        }
    }

    /// Apply the outcome of `ticket`'s fetch.
    ///
    /// Returns `false` and changes nothing when a newer ticket has been
    /// issued since.
    pub fn complete(&mut self, ticket: &FetchTicket, outcome: Result<Page>) -> bool {
        if ticket.token != self.latest_token {
            debug!(
                stale_token = ticket.token,
                current_token = self.latest_token,
                query = %ticket.query,
                "Discarding stale response"
            );
            return false;
        }

        match outcome {
            Ok(page) => {
                apply_success(self, ticket, page);
            }
            Err(err) => apply_failure(self, ticket, &err),
        }
        true
    }

    /// Release a ticket whose fetch was dropped before completing.
    ///
    /// Only the latest ticket clears `loading`. Status falls back to `Ready`
    /// when pages are held and `Idle` otherwise. Returns whether anything
    /// changed.
    pub fn abandon(&mut self, ticket: &FetchTicket) -> bool {
        if ticket.token != self.latest_token || !self.loading {
            return false;
        }
        debug!(token = ticket.token, query = %ticket.query, page = ticket.page, "Fetch abandoned before completion");
        self.loading = false;
        self.status = if self.page > 0 {
            FeedStatus::Ready
        } else {
            FeedStatus::Idle
        };
        true
    }
}

/// What happened to a requested fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response (success or failure) was folded into the state.
    Applied,
    /// A newer request superseded this one; its response was dropped.
    Stale,
    /// The controller refused the request; nothing was sent.
    Skipped,
}

/// Async feed session over a [`NewsTransport`].
///
/// Operations take `&self`, so a new search can be started while an older
/// fetch is still awaiting the network. The state lock is never held across
/// the network call, and a fetch future dropped mid-flight releases its
/// ticket so `loading` does not stick.
#[derive(Debug)]
pub struct NewsFeed<T> {
    transport: T,
    state: Mutex<FeedState>,
}

fn lock_state(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Abandons its ticket on drop unless the fetch completed.
struct InFlight<'a> {
    state: &'a Mutex<FeedState>,
    ticket: Option<FetchTicket>,
}

impl InFlight<'_> {
    fn finish(mut self) -> Option<FetchTicket> {
        self.ticket.take()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            lock_state(self.state).abandon(&ticket);
        }
    }
}

impl<T: NewsTransport> NewsFeed<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(FeedState::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a new session for `query` and fetch its first page.
    #[instrument(level = "info", skip(self))]
    pub async fn start_search(&self, query: &str, language: &str) -> FetchOutcome {
        let ticket = lock_state(&self.state).begin_search(query, language);
        self.run(ticket).await
    }

    /// Fetch the next page of the current session.
    ///
    /// No-op ([`FetchOutcome::Skipped`]) when `has_more` is false or a fetch
    /// is already in flight.
    #[instrument(level = "info", skip(self))]
    pub async fn load_more(&self) -> FetchOutcome {
        let ticket = lock_state(&self.state).begin_load_more();
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Fetch by `(query, page, language)`; see [`FeedState::begin_request`].
    #[instrument(level = "info", skip(self))]
    pub async fn request(&self, query: &str, page: u32, language: &str) -> FetchOutcome {
        let ticket = lock_state(&self.state).begin_request(query, page, language);
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> FeedState {
        lock_state(&self.state).clone()
    }

    async fn run(&self, ticket: FetchTicket) -> FetchOutcome {
        let request = ticket.to_request();
        let in_flight = InFlight {
            state: &self.state,
            ticket: Some(ticket),
        };
        let outcome = self.transport.fetch_page(&request).await;
        let Some(ticket) = in_flight.finish() else {
            return FetchOutcome::Stale;
        };
        if lock_state(&self.state).complete(&ticket, outcome) {
            FetchOutcome::Applied
        } else {
            FetchOutcome::Stale
        }
    }
}
