//! Data models for provider payloads and canonical articles.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Article`]: the canonical, provider-independent article shape
//! - [`ArticleSource`]: publisher name/id pair attached to an article
//! - [`Page`]: one normalized page of results plus its next-page cursor
//! - [`RawArticle`] and [`NewsDataResponse`]: the provider's wire schema
//!
//! Canonical articles serialize with camelCase keys (`imageUrl`,
//! `publishedAt`) so exported JSON matches what display layers expect.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A news article in canonical form.
///
/// An article is only ever stored in a feed when [`Article::is_valid`] holds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Provider-assigned identifier, absent for some providers.
    pub id: Option<String>,
    /// Display headline.
    pub title: String,
    /// Canonical link to the story.
    pub url: String,
    /// Summary text, possibly derived from truncated content.
    pub description: Option<String>,
    /// Thumbnail link.
    pub image_url: Option<String>,
    /// Publication timestamp as reported by the provider.
    pub published_at: Option<String>,
    /// Publisher.
    pub source: Option<ArticleSource>,
    /// Raw body or snippet.
    pub content: Option<String>,
    /// First credited author.
    pub author: Option<String>,
}

impl Article {
    /// Article with only the required fields set.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            url: url.into(),
            description: None,
            image_url: None,
            published_at: None,
            source: None,
            content: None,
            author: None,
        }
    }

    /// Sets the provider id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Title and url both carry non-whitespace text.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }

    /// The id, if present and non-empty.
    pub fn non_empty_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// The publisher of an article.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleSource {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// One normalized page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Valid articles in provider order.
    pub articles: Vec<Article>,
    /// Cursor for the following page; `None` once results are exhausted.
    pub next_page: Option<String>,
    /// Provider-reported total. Informational only, it does not drive `has_more`.
    pub total_results: Option<u64>,
}

/// Success envelope returned by the search endpoint.
///
/// ```json
/// {"status": "success", "totalResults": 120, "results": [...], "nextPage": "1700000000123"}
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDataResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub results: Vec<RawArticle>,
    #[serde(default, deserialize_with = "cursor_from_value")]
    pub next_page: Option<String>,
}

/// A result item exactly as the provider sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawArticle {
    pub article_id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    pub source_name: Option<String>,
    pub source_id: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub creator: Vec<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub duplicate: bool,
}

/// Accepts the cursor as a string or a number; `null` and blank mean none.
fn cursor_from_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `creator` is usually an array, sometimes a bare string, sometimes null.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => vec![s],
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_validity() {
        assert!(Article::new("Title", "https://example.com/a").is_valid());
        assert!(!Article::new("", "https://example.com/a").is_valid());
        assert!(!Article::new("Title", "").is_valid());
        assert!(!Article::new("  ", "https://example.com/a").is_valid());
    }

    #[test]
    fn empty_id_is_treated_as_absent() {
        let article = Article::new("T", "u").with_id("");
        assert_eq!(article.non_empty_id(), None);
        let article = Article::new("T", "u").with_id("42");
        assert_eq!(article.non_empty_id(), Some("42"));
    }

    #[test]
    fn article_serializes_camel_case() {
        let mut article = Article::new("T", "https://example.com");
        article.image_url = Some("https://example.com/i.png".into());
        article.published_at = Some("2025-05-06 14:30:00".into());

        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("\"imageUrl\""));
        assert!(json.contains("\"publishedAt\""));
    }

    #[test]
    fn response_deserializes_full_item() {
        let json = r#"{
            "status": "success",
            "totalResults": 2,
            "results": [{
                "article_id": "abc",
                "title": "Headline",
                "link": "https://example.com/a",
                "description": null,
                "content": "Body",
                "image_url": "https://example.com/a.jpg",
                "pubDate": "2025-05-06 14:30:00",
                "source_name": "Example",
                "source_id": "example",
                "creator": ["Jane Doe"],
                "duplicate": false
            }],
            "nextPage": "17000"
        }"#;

        let resp: NewsDataResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status.as_deref(), Some("success"));
        assert_eq!(resp.total_results, Some(2));
        assert_eq!(resp.next_page.as_deref(), Some("17000"));
        let raw = &resp.results[0];
        assert_eq!(raw.article_id.as_deref(), Some("abc"));
        assert_eq!(raw.pub_date.as_deref(), Some("2025-05-06 14:30:00"));
        assert_eq!(raw.creator, vec!["Jane Doe".to_string()]);
        assert!(!raw.duplicate);
    }

    #[test]
    fn numeric_cursor_is_stringified() {
        let resp: NewsDataResponse =
            serde_json::from_str(r#"{"status":"success","results":[],"nextPage":12345}"#).unwrap();
        assert_eq!(resp.next_page.as_deref(), Some("12345"));
    }

    #[test]
    fn null_or_missing_cursor_means_exhausted() {
        let resp: NewsDataResponse =
            serde_json::from_str(r#"{"status":"success","results":[],"nextPage":null}"#).unwrap();
        assert_eq!(resp.next_page, None);
        let resp: NewsDataResponse =
            serde_json::from_str(r#"{"status":"success","results":[]}"#).unwrap();
        assert_eq!(resp.next_page, None);
    }

    #[test]
    fn creator_tolerates_string_and_null() {
        let raw: RawArticle = serde_json::from_str(r#"{"creator":"Solo Writer"}"#).unwrap();
        assert_eq!(raw.creator, vec!["Solo Writer".to_string()]);
        let raw: RawArticle = serde_json::from_str(r#"{"creator":null,"duplicate":null}"#).unwrap();
        assert!(raw.creator.is_empty());
        assert!(!raw.duplicate);
    }
}
