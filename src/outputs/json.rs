//! JSON export of a feed snapshot.
//!
//! Files are organized by local date and named after the query:
//! `{json_output_dir}/{date}/{query-slug}.json`. Exporting the same query
//! twice on one day overwrites the earlier file.

use crate::feed::{FeedState, FeedStatus};
use crate::models::Article;
use crate::utils::slugify_title;
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialized form of a [`FeedState`].
#[derive(Debug, Serialize)]
pub struct FeedExport<'a> {
    /// Export date in `YYYY-MM-DD` format.
    pub local_date: String,
    /// Export time in `HH:MM:SS` format.
    pub local_time: String,
    pub query: Option<&'a str>,
    pub language: &'a str,
    pub status: FeedStatus,
    /// Pages merged in the session.
    pub pages: u32,
    pub has_more: bool,
    pub error: Option<&'a str>,
    pub articles: &'a [Article],
}

impl<'a> FeedExport<'a> {
    pub fn from_state(state: &'a FeedState) -> Self {
        let now = Local::now();
        Self {
            local_date: now.date_naive().to_string(),
            local_time: now.time().format("%H:%M:%S").to_string(),
            query: state.query(),
            language: state.language(),
            status: state.status(),
            pages: state.page(),
            has_more: state.has_more(),
            error: state.error(),
            articles: state.articles(),
        }
    }

    /// File stem derived from the query.
    pub fn file_stem(&self) -> String {
        let slug = self.query.map(slugify_title).unwrap_or_default();
        if slug.is_empty() { "feed".to_string() } else { slug }
    }
}

/// Write `state` under `json_output_dir` and return the written path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_feed(
    state: &FeedState,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let export = FeedExport::from_state(state);
    let json = serde_json::to_string_pretty(&export)?;

    let dir = PathBuf::from(json_output_dir).join(&export.local_date);
    info!(dir = %dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = dir.join(format!("{}.json", export.file_stem()));
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = export.articles.len(), "Wrote feed JSON");

    Ok(path)
}
