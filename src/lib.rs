//! # News Feed
//!
//! Incremental fetch-and-merge engine for a paginated news search API.
//!
//! A display layer starts a search, asks for more pages as the reader scrolls,
//! and renders whatever [`FeedState`] holds: a de-duplicated, ordered article
//! list plus `loading`, `error` and `has_more` flags.
//!
//! ## Architecture
//!
//! 1. **Query controller** ([`feed`]): decides new-search vs load-more,
//!    issues request tokens, discards stale responses
//! 2. **Transport & normalizer** ([`transport`], [`normalize`]): one HTTP call,
//!    error-envelope interpretation, provider schema → [`Article`]
//! 3. **Merge & dedup** ([`merge`]): replace or append, dropping articles that
//!    share an id, url or title with anything already held
//!
//! ## Usage
//!
//! ```no_run
//! use news_feed::{FeedConfig, NewsDataClient, NewsFeed, RetryTransport};
//!
//! # async fn demo() -> Result<(), news_feed::FeedError> {
//! let config = FeedConfig::new("https://newsdata.io/api/1/latest", "pub_xxx");
//! let transport = RetryTransport::from_config(NewsDataClient::new(config.clone())?, &config);
//! let feed = NewsFeed::new(transport);
//!
//! feed.start_search("climate", "en").await;
//! feed.load_more().await;
//!
//! let state = feed.snapshot().await;
//! for article in state.articles() {
//!     println!("{} <{}>", article.title, article.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod retry;
pub mod transport;
pub mod utils;

pub use config::{FeedConfig, load_config};
pub use error::{FeedError, Result};
pub use feed::{FeedState, FeedStatus, FetchOutcome, FetchTicket, NewsFeed};
pub use models::{Article, ArticleSource, Page};
pub use retry::RetryTransport;
pub use transport::{NewsDataClient, NewsTransport, PageRequest};
