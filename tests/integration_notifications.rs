#![allow(clippy::unwrap_used, clippy::panic, clippy::clone_on_ref_ptr, missing_debug_implementations, unreachable_pub)]
use appcast_server::adapters::memory::InMemoryTokenStore;
use appcast_server::adapters::store::BroadcastLog;
use appcast_server::domain::delivery::DeliveryErrorKind;
use appcast_server::domain::notification::Priority;
use appcast_server::domain::token::DeviceToken;
use common::{NOW, TestApp};
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use time::Duration;

mod common;

#[tokio::test]
async fn test_send_notification_reports_counts_and_prunes_invalid_tokens() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["tok_a", "tok_b", "tok_c"], NOW - Duration::days(1)).await;
    app.gateway.fail("tok_b", DeliveryErrorKind::InvalidHandle);
    app.gateway.fail("tok_c", DeliveryErrorKind::TransientFailure);

    let resp = app
        .post_json(
            "/send-notification",
            &json!({
                "appId": "notes",
                "appName": "Notes",
                "type": "NEW_RELEASE",
                "downloadUrl": "https://dl.example.com/notes.apk"
            }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["successCount"], 1);
    assert_eq!(body["failureCount"], 2);
    assert_eq!(body["totalSent"], 3);
    assert_eq!(body["message"], "Notification sent to 1 of 3 devices");

    // Only the invalid handle is pruned; transient failures stay registered.
    assert_eq!(app.token_values().await, vec!["tok_a".to_string(), "tok_c".to_string()]);

    let sent = app.gateway.sent();
    assert_eq!(sent.len(), 1);
    let payload = &sent[0].payload;
    assert_eq!(payload.title(), "Notes update");
    assert_eq!(payload.body(), "A new version of Notes is available");
    assert_eq!(payload.priority(), Priority::High);
    assert_eq!(payload.data()["type"], "NEW_RELEASE");
    assert_eq!(payload.data()["appId"], "notes");
    assert_eq!(payload.data()["downloadUrl"], "https://dl.example.com/notes.apk");

    let reports = app.log.reports_since(NOW - Duration::days(1)).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].success_count, 1);
    assert_eq!(reports[0].failure_count, 2);
    assert_eq!(reports[0].timestamp, NOW);
}

#[tokio::test]
async fn test_send_notification_uses_explicit_title_and_body() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["tok_a"], NOW).await;

    let resp = app
        .post_json(
            "/send-notification",
            &json!({ "appId": "notes", "type": "PROMO", "title": "Big news", "body": "Read all about it" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let sent = app.gateway.sent();
    assert_eq!(sent[0].payload.title(), "Big news");
    assert_eq!(sent[0].payload.body(), "Read all about it");
}

#[tokio::test]
async fn test_send_notification_sends_duplicate_tokens_once() {
    let store = InMemoryTokenStore::with_tokens(vec![
        DeviceToken::new("tok_a", NOW - Duration::days(3)),
        DeviceToken::new("tok_b", NOW - Duration::days(2)),
        DeviceToken::new("tok_a", NOW - Duration::days(1)),
    ]);
    let app = TestApp::spawn_with_store(Arc::new(store)).await;

    let resp = app.post_json("/send-notification", &json!({ "appId": "notes", "type": "NEW_RELEASE" })).await;

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["totalSent"], 2);
    assert_eq!(app.gateway.sent()[0].tokens, vec!["tok_a".to_string(), "tok_b".to_string()]);
}

#[tokio::test]
async fn test_send_notification_without_tokens_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = app.post_json("/send-notification", &json!({ "appId": "notes", "type": "NEW_RELEASE" })).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No device tokens registered");
    assert!(app.gateway.sent().is_empty());
}

#[tokio::test]
async fn test_send_notification_missing_fields() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["tok_a"], NOW).await;

    let resp = app.post_json("/send-notification", &json!({ "appName": "Notes" })).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing required fields: appId, type");
    assert!(app.gateway.sent().is_empty());
}

#[tokio::test]
async fn test_send_notification_provider_failure_leaves_tokens_untouched() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["tok_a", "tok_b"], NOW).await;
    app.gateway.set_broken(true);

    let resp = app.post_json("/send-notification", &json!({ "appId": "notes", "type": "NEW_RELEASE" })).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(app.token_values().await.len(), 2);
    assert!(app.log.reports_since(NOW - Duration::days(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_send_progress_to_single_device_skips_reconciliation() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["tok_a", "tok_b"], NOW).await;

    let resp = app
        .post_json("/send-progress", &json!({ "appId": "notes", "appName": "Notes", "progress": 0, "deviceToken": "tok_b" }))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "message": "Progress update sent" }));

    let sent = app.gateway.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tokens, vec!["tok_b".to_string()]);
    assert_eq!(sent[0].payload.title(), "Downloading Notes");
    assert_eq!(sent[0].payload.body(), "0% complete");
    assert_eq!(sent[0].payload.data()["progress"], "0");
    assert!(app.log.reports_since(NOW - Duration::days(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_send_progress_single_invalid_device_is_reported_not_pruned() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["tok_a"], NOW).await;
    app.gateway.fail("tok_a", DeliveryErrorKind::InvalidHandle);

    let resp = app.post_json("/send-progress", &json!({ "appId": "notes", "progress": 40, "deviceToken": "tok_a" })).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Delivery failed: invalid_handle");
    assert_eq!(app.token_values().await, vec!["tok_a".to_string()]);
}

#[tokio::test]
async fn test_send_progress_broadcast() {
    let app = TestApp::spawn().await;
    app.seed_tokens(&["tok_a", "tok_b"], NOW).await;
    app.gateway.fail("tok_a", DeliveryErrorKind::InvalidHandle);

    let resp = app.post_json("/send-progress", &json!({ "appId": "notes", "progress": 75 })).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "successCount": 1, "failureCount": 1 }));
    assert_eq!(app.token_values().await, vec!["tok_b".to_string()]);
}

#[tokio::test]
async fn test_send_progress_validation() {
    let app = TestApp::spawn().await;

    let resp = app.post_json("/send-progress", &json!({ "appId": "notes" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing required fields: progress");

    let resp = app.post_json("/send-progress", &json!({ "appId": "notes", "progress": 101 })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_test_notification() {
    let app = TestApp::spawn().await;

    let resp = app.post_json("/test-notification", &json!({ "token": "tok_x", "appName": "Notes" })).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "message": "Test notification sent" }));

    let sent = app.gateway.sent();
    assert_eq!(sent[0].tokens, vec!["tok_x".to_string()]);
    assert_eq!(sent[0].payload.title(), "Test notification");
    assert_eq!(sent[0].payload.body(), "Push notifications are working for Notes");
    assert_eq!(sent[0].payload.message_type(), Some("TEST"));
}

#[tokio::test]
async fn test_test_notification_missing_token() {
    let app = TestApp::spawn().await;

    let resp = app.post_json("/test-notification", &json!({ "appName": "Notes" })).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing required fields: token");
}
