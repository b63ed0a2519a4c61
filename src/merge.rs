//! Cross-page merge and de-duplication.
//!
//! An incoming article is a duplicate of an already-held one when ANY of
//! these match:
//!
//! | Tier | Rule |
//! |------|------|
//! | id | both ids present and non-empty, and equal |
//! | url | urls equal |
//! | title | titles equal (exact, case-sensitive) |
//!
//! The rule is applied against everything already accumulated and against
//! earlier survivors of the same page, so it holds pairwise over the whole
//! feed. Page 1 of a session replaces the feed instead of appending to it.
//!
//! This module is the only writer of [`FeedState`] once a fetch completes.

use crate::error::FeedError;
use crate::feed::{FeedState, FeedStatus, FetchTicket};
use crate::models::{Article, Page};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Which tier flagged an article as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    Id,
    Url,
    Title,
}

/// Whether incoming articles replace or extend the held list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Replace,
    Append,
}

/// Counts from one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub dropped: usize,
}

/// Set-backed lookup of the keys held by a list of articles.
#[derive(Debug, Default)]
pub struct DedupIndex {
    ids: HashSet<String>,
    urls: HashSet<String>,
    titles: HashSet<String>,
}

impl DedupIndex {
    pub fn from_articles<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Self {
        let mut index = Self::default();
        for article in articles {
            index.insert(article);
        }
        index
    }

    /// First tier on which `article` collides with an indexed article.
    pub fn matches(&self, article: &Article) -> Option<DuplicateKey> {
        if article.non_empty_id().is_some_and(|id| self.ids.contains(id)) {
            Some(DuplicateKey::Id)
        } else if self.urls.contains(&article.url) {
            Some(DuplicateKey::Url)
        } else if self.titles.contains(&article.title) {
            Some(DuplicateKey::Title)
        } else {
            None
        }
    }

    pub fn insert(&mut self, article: &Article) {
        if let Some(id) = article.non_empty_id() {
            self.ids.insert(id.to_string());
        }
        self.urls.insert(article.url.clone());
        self.titles.insert(article.title.clone());
    }
}

/// Merge `incoming` into `existing`, keeping incoming order for survivors.
pub fn merge_articles(
    existing: &mut Vec<Article>,
    incoming: Vec<Article>,
    mode: MergeMode,
) -> MergeStats {
    if mode == MergeMode::Replace {
        existing.clear();
    }

    let mut index = DedupIndex::from_articles(existing.iter());
    let mut stats = MergeStats::default();

    for article in incoming {
        if !article.is_valid() {
            stats.dropped += 1;
            continue;
        }
        if let Some(key) = index.matches(&article) {
            debug!(?key, title = %article.title, url = %article.url, "Dropped duplicate article");
            stats.dropped += 1;
            continue;
        }
        index.insert(&article);
        existing.push(article);
        stats.added += 1;
    }

    stats
}

/// Fold a successful page into the state that issued `ticket`.
pub(crate) fn apply_success(state: &mut FeedState, ticket: &FetchTicket, page: Page) -> MergeStats {
    let mode = if ticket.is_new_search() {
        MergeMode::Replace
    } else {
        MergeMode::Append
    };

    let stats = merge_articles(&mut state.articles, page.articles, mode);

    state.has_more = page.next_page.is_some();
    state.cursor = page.next_page;
    state.page = ticket.page();
    state.error = None;
    state.loading = false;
    state.status = FeedStatus::Ready;

    info!(
        query = %ticket.query(),
        page = ticket.page(),
        ?mode,
        added = stats.added,
        dropped = stats.dropped,
        total = state.articles.len(),
        has_more = state.has_more,
        "Merged page"
    );
    stats
}

/// Record a failed fetch. A failed load-more keeps what is already shown.
pub(crate) fn apply_failure(state: &mut FeedState, ticket: &FetchTicket, error: &FeedError) {
    if ticket.is_new_search() {
        state.articles.clear();
        state.cursor = None;
        state.has_more = false;
        state.page = 0;
    }
    state.error = Some(error.to_string());
    state.loading = false;
    state.status = FeedStatus::Errored;

    warn!(
        query = %ticket.query(),
        page = ticket.page(),
        kept = state.articles.len(),
        error = %error,
        "Fetch failed"
    );
}
