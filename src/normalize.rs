//! Provider result → canonical [`Article`] mapping.
//!
//! Normalization runs in three passes over a successful response:
//!
//! 1. drop entries the provider flagged as `duplicate`, or whose title or
//!    content is the `[Removed]` placeholder
//! 2. map the remaining entries field by field
//! 3. drop anything that fails [`Article::is_valid`]

use crate::models::{Article, ArticleSource, NewsDataResponse, Page, RawArticle};
use crate::utils::truncate_chars;
use tracing::debug;

/// Character budget for descriptions derived from `content`.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// Placeholder some providers substitute for taken-down stories.
const REMOVED_MARKER: &str = "[Removed]";

/// Turn a decoded success envelope into a [`Page`].
///
/// The next-page cursor is passed through untouched.
pub fn normalize_response(response: NewsDataResponse) -> Page {
    let received = response.results.len();
    let articles: Vec<Article> = response
        .results
        .into_iter()
        .filter(|raw| !raw.duplicate && !is_removed(raw))
        .map(to_article)
        .filter(Article::is_valid)
        .collect();

    debug!(
        received,
        kept = articles.len(),
        next_page = ?response.next_page,
        "Normalized provider results"
    );

    Page {
        articles,
        next_page: response.next_page,
        total_results: response.total_results,
    }
}

fn is_removed(raw: &RawArticle) -> bool {
    raw.title.as_deref() == Some(REMOVED_MARKER) || raw.content.as_deref() == Some(REMOVED_MARKER)
}

/// Map one provider item into canonical shape. Does not check validity.
pub fn to_article(raw: RawArticle) -> Article {
    let description = non_blank(raw.description)
        .or_else(|| {
            raw.content
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .map(|c| truncate_chars(c.trim(), DESCRIPTION_MAX_CHARS))
        });

    let source = match (non_blank(raw.source_name), non_blank(raw.source_id)) {
        (None, None) => None,
        (name, id) => Some(ArticleSource { name, id }),
    };

    let author = raw
        .creator
        .into_iter()
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty());

    Article {
        id: non_blank(raw.article_id),
        title: raw.title.unwrap_or_default(),
        url: raw.link.unwrap_or_default(),
        description,
        image_url: non_blank(raw.image_url),
        published_at: non_blank(raw.pub_date),
        source,
        content: raw.content,
        author,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
