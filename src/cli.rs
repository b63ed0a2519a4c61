//! Command-line interface definitions for the news feed binary.
//!
//! Connection settings can come from a YAML config file, environment
//! variables or flags; flags and env vars win over the file.

use clap::Parser;

/// Command-line arguments for `news-feed`.
///
/// # Examples
///
/// ```sh
/// # First page of the default query
/// NEWS_API_KEY=pub_xxx news-feed
///
/// # Three pages of a specific search, exported to JSON
/// news-feed "climate change" -l en -p 3 -j ./json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search term (defaults to the configured default query)
    pub query: Option<String>,

    /// Language filter (defaults to the configured language)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Number of pages to load, counting the first
    #[arg(short, long, default_value_t = 1)]
    pub pages: u32,

    /// Output directory for the JSON export
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Search endpoint URL
    #[arg(long, env = "NEWS_API_URL")]
    pub api_url: Option<String>,

    /// Provider API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Automatic retries per page for transient failures
    #[arg(long)]
    pub max_retries: Option<usize>,
}
