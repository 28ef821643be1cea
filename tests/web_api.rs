//! Web API Tests
//!
//! Integration tests for the admin-ajax, options and health endpoints.

mod common;

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use common::{raw_items, ScriptedFetcher};
use feedsync::config::WebConfig;
use feedsync::store::DocumentType;
use feedsync::{
    Database, DocumentStore, MemoryDocumentStore, SettingsService, SyncConfig, SyncEngine,
    WebServer,
};
use serde_json::{json, Value};

const ADMIN_TOKEN: &str = "test-admin-token";
const FEED: &str = "https://news.example.com/rss";

/// Create a test configuration.
fn create_test_config() -> WebConfig {
    WebConfig {
        enabled: true,
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![],
        admin_token: ADMIN_TOKEN.to_string(),
    }
}

struct Harness {
    server: TestServer,
    store: Arc<MemoryDocumentStore>,
    fetcher: Arc<ScriptedFetcher>,
}

/// Create a test server with an in-memory database and memory store.
async fn create_test_server() -> Harness {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let store = Arc::new(MemoryDocumentStore::new());
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.set_items(FEED, raw_items(FEED, 8));

    let engine = Arc::new(SyncEngine::new(
        store.clone(),
        fetcher.clone(),
        &SyncConfig::default(),
    ));
    let settings = Arc::new(SettingsService::new(db, engine));
    let web = WebServer::new(&create_test_config(), settings).unwrap();

    let server = TestServer::new(web.router()).expect("Failed to create test server");
    Harness {
        server,
        store,
        fetcher,
    }
}

fn bearer() -> String {
    format!("Bearer {}", ADMIN_TOKEN)
}

async fn save_feed_urls(h: &Harness, urls: &str) -> Value {
    let response = h
        .server
        .post("/api/options")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({ "rss_feed_urls": urls }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

#[tokio::test]
async fn test_health() {
    let h = create_test_server().await;
    let response = h.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_fetch_recent_requires_admin() {
    let h = create_test_server().await;
    save_feed_urls(&h, FEED).await;
    let calls = h.fetcher.calls();

    let response = h
        .server
        .post("/api/admin-ajax")
        .form(&json!({ "action": "fetch_recent_rss_posts" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["data"],
        "You do not have permission to perform this action."
    );
    assert_eq!(h.fetcher.calls(), calls);
}

#[tokio::test]
async fn test_fetch_recent_wrong_token() {
    let h = create_test_server().await;

    let response = h
        .server
        .post("/api/admin-ajax")
        .add_header(AUTHORIZATION, "Bearer not-the-token".to_string())
        .form(&json!({ "action": "fetch_recent_rss_posts" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(h.fetcher.calls(), 0);
}

#[tokio::test]
async fn test_fetch_recent_returns_preview() {
    let h = create_test_server().await;
    save_feed_urls(&h, FEED).await;
    let mutations = h.store.mutation_count();

    let response = h
        .server
        .post("/api/admin-ajax")
        .add_header(AUTHORIZATION, bearer())
        .form(&json!({ "action": "fetch_recent_rss_posts" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["title"], "Item 0");
    assert_eq!(items[0]["link"], format!("{FEED}/items/0"));
    assert_eq!(items[0]["description"], "<p>Description 0</p>");
    assert_eq!(h.store.mutation_count(), mutations);
}

#[tokio::test]
async fn test_fetch_recent_with_no_feeds() {
    let h = create_test_server().await;

    let response = h
        .server
        .post("/api/admin-ajax")
        .add_header(AUTHORIZATION, bearer())
        .form(&json!({ "action": "fetch_recent_rss_posts" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": true, "data": [] })
    );
    assert_eq!(h.fetcher.calls(), 0);
}

#[tokio::test]
async fn test_unknown_action() {
    let h = create_test_server().await;

    let response = h
        .server
        .post("/api/admin-ajax")
        .add_header(AUTHORIZATION, bearer())
        .form(&json!({ "action": "delete_everything" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_submit_options_syncs_feeds() {
    let h = create_test_server().await;

    let body = save_feed_urls(&h, &format!("{FEED}\n\n")).await;

    assert_eq!(body["data"]["changed"], true);
    let syncs = body["data"]["syncs"].as_array().unwrap();
    assert_eq!(syncs.len(), 1);
    assert_eq!(syncs[0]["summary"], "1 of 1 sources synced successfully");
    assert_eq!(h.store.list(DocumentType::Post).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_resubmit_unchanged_options_resyncs() {
    let h = create_test_server().await;
    save_feed_urls(&h, FEED).await;

    let body = save_feed_urls(&h, FEED).await;

    assert_eq!(body["data"]["changed"], false);
    assert_eq!(body["data"]["syncs"].as_array().unwrap().len(), 1);
    assert_eq!(h.store.len(), 5);
}

#[tokio::test]
async fn test_get_options() {
    let h = create_test_server().await;
    save_feed_urls(&h, &format!(" {FEED} \n\nhttps://other.example.com/atom")).await;

    let response = h
        .server
        .get("/api/options")
        .add_header(AUTHORIZATION, bearer())
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(
        body["data"]["sources"],
        json!([FEED, "https://other.example.com/atom"])
    );
}

#[tokio::test]
async fn test_options_require_admin() {
    let h = create_test_server().await;

    h.server
        .get("/api/options")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = h
        .server
        .post("/api/options")
        .json(&json!({ "rss_feed_urls": FEED }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"]["code"], "FORBIDDEN");
    assert_eq!(h.fetcher.calls(), 0);
}

#[tokio::test]
async fn test_submit_other_settings_group() {
    let h = create_test_server().await;

    let response = h
        .server
        .post("/api/options")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({ "option_page": "general", "rss_feed_urls": FEED }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(h.fetcher.calls(), 0);
}
