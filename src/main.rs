//! # news-feed
//!
//! Command-line front end for the `news_feed` engine: starts a search, pages
//! through results with load-more, prints one line per article and can export
//! the final feed as JSON.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=pub_xxx news-feed "climate change" -p 3 -j ./json
//! ```

use clap::Parser;
use news_feed::outputs::json;
use news_feed::utils::ensure_writable_dir;
use news_feed::{FeedConfig, FetchOutcome, NewsDataClient, NewsFeed, RetryTransport, load_config};
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

/// Merge file config with flag/env overrides.
fn resolve_config(args: &Cli) -> Result<FeedConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => FeedConfig::default(),
    };
    if let Some(url) = &args.api_url {
        config.endpoint = url.clone();
    }
    if let Some(key) = &args.api_key {
        config.api_key = key.clone();
    }
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_secs = timeout;
    }
    if let Some(retries) = args.max_retries {
        config.max_retries = retries;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.query, ?args.language, pages = args.pages, "Parsed CLI arguments");

    let config = resolve_config(&args)?;

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    let query = args
        .query
        .clone()
        .unwrap_or_else(|| config.default_query.clone());
    let language = config.language.clone();

    let transport = RetryTransport::from_config(NewsDataClient::new(config.clone())?, &config);
    let feed = NewsFeed::new(transport);

    info!(%query, %language, pages = args.pages, "Starting search");
    feed.start_search(&query, &language).await;

    while feed.snapshot().await.page() < args.pages {
        match feed.load_more().await {
            FetchOutcome::Applied => {
                let state = feed.snapshot().await;
                if state.error().is_some() {
                    break;
                }
            }
            FetchOutcome::Skipped => {
                info!("No more pages available");
                break;
            }
            FetchOutcome::Stale => {
                warn!("Load-more response was superseded");
                break;
            }
        }
    }

    let state = feed.snapshot().await;
    for article in state.articles() {
        let source = article
            .source
            .as_ref()
            .and_then(|s| s.name.as_deref().or(s.id.as_deref()))
            .unwrap_or("unknown source");
        println!("{} [{}] <{}>", article.title, source, article.url);
    }

    if let Some(dir) = &args.json_output_dir {
        match json::write_feed(&state, dir).await {
            Ok(path) => info!(path = %path.display(), "Exported feed"),
            Err(e) => error!(error = %e, "Failed to write JSON export"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = state.articles().len(),
        pages = state.page(),
        has_more = state.has_more(),
        "Execution complete"
    );

    match state.error() {
        Some(message) => {
            error!(%message, "Feed finished with an error");
            Err(message.into())
        }
        None => Ok(()),
    }
}
