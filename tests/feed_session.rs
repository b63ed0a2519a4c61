//! End-to-end feed sessions over a mock provider.
//!
//! Exercises `NewsFeed` + `NewsDataClient` together: pagination by cursor,
//! cross-page de-duplication, exhaustion, and error surfacing into state.

use news_feed::{
    FeedConfig, FeedStatus, FetchOutcome, NewsDataClient, NewsFeed, RetryTransport,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn feed_for(server: &MockServer) -> NewsFeed<NewsDataClient> {
    let config = FeedConfig::new(format!("{}/api/1/latest", server.uri()), "test-key");
    NewsFeed::new(NewsDataClient::new(config).unwrap())
}

fn item(id: &str, link: &str, title: &str) -> serde_json::Value {
    json!({
        "article_id": id,
        "title": title,
        "link": link,
        "description": null,
        "content": format!("Body of {title}"),
        "creator": null,
        "duplicate": false
    })
}

async fn mount_page(
    server: &MockServer,
    query: &str,
    cursor: Option<&str>,
    results: Vec<serde_json::Value>,
    next: Option<&str>,
) {
    let mut body = json!({
        "status": "success",
        "totalResults": 999,
        "results": results
    });
    if let Some(next) = next {
        body["nextPage"] = json!(next);
    }
    let mock = Mock::given(method("GET")).and(query_param("q", query));
    let mock = match cursor {
        Some(cursor) => mock.and(query_param("page", cursor)),
        None => mock.and(query_param_is_missing("page")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn paginates_and_deduplicates_across_pages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "news",
        None,
        vec![item("1", "u1", "A"), item("2", "u2", "B")],
        Some("p2"),
    )
    .await;
    mount_page(
        &server,
        "news",
        Some("p2"),
        vec![
            item("1", "u1", "A2"),
            item("3", "u9", "B"),
            item("4", "u2", "C"),
            item("6", "u4", "D"),
        ],
        Some("p3"),
    )
    .await;

    let feed = feed_for(&server);
    assert_eq!(feed.start_search("news", "en").await, FetchOutcome::Applied);
    assert_eq!(feed.load_more().await, FetchOutcome::Applied);

    let state = feed.snapshot().await;
    let ids: Vec<_> = state.articles().iter().filter_map(|a| a.id.as_deref()).collect();
    assert_eq!(ids, vec!["1", "2", "6"]);
    assert_eq!(state.page(), 2);
    assert!(state.has_more());
    assert_eq!(state.cursor(), Some("p3"));
    assert_eq!(state.status(), FeedStatus::Ready);
    assert_eq!(
        state.articles()[0].description.as_deref(),
        Some("Body of A"),
        "description derived from content"
    );
}

#[tokio::test]
async fn exhausted_feed_makes_no_further_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "totalResults": 1,
            "results": [item("1", "u1", "A")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let feed = feed_for(&server);
    feed.start_search("solo", "en").await;
    assert!(!feed.snapshot().await.has_more());

    assert_eq!(feed.load_more().await, FetchOutcome::Skipped);
    assert_eq!(feed.request("solo", 2, "en").await, FetchOutcome::Skipped);
}

#[tokio::test]
async fn provider_error_on_new_search_clears_previous_results() {
    let server = MockServer::start().await;
    mount_page(&server, "good", None, vec![item("1", "u1", "A")], Some("p2")).await;
    Mock::given(method("GET"))
        .and(query_param("q", "bad"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status": "error",
            "results": {"message": "Query is too long", "code": "UnsupportedQueryLength"}
        })))
        .mount(&server)
        .await;

    let feed = feed_for(&server);
    feed.start_search("good", "en").await;
    assert_eq!(feed.snapshot().await.articles().len(), 1);

    feed.start_search("bad", "en").await;
    let state = feed.snapshot().await;
    assert!(state.articles().is_empty());
    assert_eq!(state.error(), Some("Query is too long"));
    assert!(!state.loading());
    assert!(!state.has_more());
    assert_eq!(state.status(), FeedStatus::Errored);
}

#[tokio::test]
async fn failed_load_more_keeps_rendered_articles() {
    let server = MockServer::start().await;
    mount_page(&server, "news", None, vec![item("1", "u1", "A")], Some("p2")).await;
    Mock::given(method("GET"))
        .and(query_param("page", "p2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let feed = feed_for(&server);
    feed.start_search("news", "en").await;
    feed.load_more().await;

    let state = feed.snapshot().await;
    assert_eq!(state.articles().len(), 1);
    assert_eq!(
        state.error(),
        Some("Request failed with status 500 Internal Server Error")
    );
    assert!(!state.loading());
    assert!(state.has_more(), "cursor kept so the caller can retry");
}

#[tokio::test]
async fn configuration_error_surfaces_in_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = FeedConfig::new(server.uri(), "  ");
    let feed = NewsFeed::new(NewsDataClient::new(config).unwrap());

    assert_eq!(feed.start_search("news", "en").await, FetchOutcome::Applied);
    let state = feed.snapshot().await;
    assert!(!state.loading());
    assert!(state.error().unwrap().starts_with("configuration error"));
    assert!(state.articles().is_empty());
}

#[tokio::test]
async fn retry_transport_recovers_from_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "news", None, vec![item("1", "u1", "A")], None).await;

    let config = FeedConfig::new(format!("{}/api/1/latest", server.uri()), "test-key");
    let transport = RetryTransport::new(
        NewsDataClient::new(config).unwrap(),
        2,
        Duration::from_millis(1),
    );
    let feed = NewsFeed::new(transport);

    feed.start_search("news", "en").await;
    let state = feed.snapshot().await;
    assert_eq!(state.error(), None);
    assert_eq!(state.articles().len(), 1);
}

#[tokio::test]
async fn network_failure_in_state_hides_api_key() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = FeedConfig::new(format!("http://127.0.0.1:{port}/api/1/latest"), "SECRET-KEY-123");
    let feed = NewsFeed::new(NewsDataClient::new(config).unwrap());

    feed.start_search("q", "en").await;
    let state = feed.snapshot().await;
    let error = state.error().unwrap();
    assert!(error.starts_with("network error"));
    assert!(!error.contains("SECRET-KEY-123"), "key leaked: {error}");
}
