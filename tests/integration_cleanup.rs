#![allow(clippy::unwrap_used, clippy::panic, missing_debug_implementations, unreachable_pub)]
use common::{NOW, TestApp, UnavailableStore};
use reqwest::StatusCode;
use std::sync::Arc;
use time::Duration;
use time::format_description::well_known::Rfc3339;

mod common;

#[tokio::test]
async fn test_cleanup_deletes_stale_tokens_once() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["stale_1", "stale_2"], NOW - Duration::days(120)).await;
    app.seed_tokens(&["fresh"], NOW - Duration::days(10)).await;
    // Exactly at the cutoff is kept.
    app.seed_tokens(&["boundary"], NOW - Duration::days(90)).await;

    let url = format!("{}/jobs/cleanup-tokens", app.mgmt_url);

    let resp = app.client.post(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["deletedCount"], 2);
    assert_eq!(body["message"], "Deleted 2 stale tokens");
    assert_eq!(body["timestamp"], NOW.format(&Rfc3339).unwrap());

    assert_eq!(app.token_values().await, vec!["boundary".to_string(), "fresh".to_string()]);

    let resp = app.client.post(&url).send().await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["deletedCount"], 0);
}

#[tokio::test]
async fn test_cleanup_follows_the_clock() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["tok_a"], NOW).await;

    app.clock.advance(Duration::days(91));
    let resp = app.client.post(format!("{}/jobs/cleanup-tokens", app.mgmt_url)).send().await.unwrap();

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["deletedCount"], 1);
    assert!(app.token_values().await.is_empty());
}

#[tokio::test]
async fn test_cleanup_store_failure_is_signalled() {
    let app = TestApp::spawn_with_store(Arc::new(UnavailableStore)).await;

    let resp = app.client.post(format!("{}/jobs/cleanup-tokens", app.mgmt_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_cleanup_rejects_get() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(format!("{}/jobs/cleanup-tokens", app.mgmt_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
