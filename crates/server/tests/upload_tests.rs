//! Image upload and duplicate-suppression integration tests.

mod common;

use axum::http::StatusCode;
use base64::Engine;
use common::server::TestServer;
use serde_json::json;
use std::time::{Duration, Instant};

fn data_uri(bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[tokio::test]
async fn upload_requires_admin() {
    let server = TestServer::new().await;

    let (status, _) = server
        .post("/api/upload/image", None, json!({"imageData": data_uri(b"x")}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_token = server.token_for(uuid::Uuid::new_v4(), "user");
    let (status, _) = server
        .post(
            "/api/upload/image",
            Some(&user_token),
            json!({"imageData": data_uri(b"x")}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn upload_rejects_non_image_payloads() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    let (status, body) = server
        .post(
            "/api/upload/image",
            Some(&token),
            json!({"imageData": "data:text/plain;base64,AAAA"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("data:image/"));

    let (status, _) = server
        .post("/api/upload/image", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_within_ttl_is_served_from_cache() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;
    let body = json!({"imageData": data_uri(b"same bytes")});

    let (status, first) = server
        .post("/api/upload/image", Some(&token), body.clone())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["isDuplicate"], false);
    assert_eq!(server.storage.upload_count(), 1);

    let (status, second) = server
        .post("/api/upload/image", Some(&token), body)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["isDuplicate"], true);
    assert_eq!(second["url"], first["url"]);
    assert_eq!(second["contentHash"], first["contentHash"]);
    // The store saw exactly one upload.
    assert_eq!(server.storage.upload_count(), 1);
}

#[tokio::test]
async fn store_existence_check_backstops_an_expired_cache() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;
    let body = json!({"imageData": data_uri(b"same bytes")});

    let (_, first) = server
        .post("/api/upload/image", Some(&token), body.clone())
        .await;
    assert_eq!(first["isDuplicate"], false);

    // Simulate TTL expiry by sweeping with a clock past the window.
    let evicted = server
        .state
        .upload_cache
        .sweep_at(Instant::now() + Duration::from_secs(60))
        .await;
    assert_eq!(evicted, 1);

    // The cache misses, but the store's existence check still dedups.
    let (status, second) = server
        .post("/api/upload/image", Some(&token), body)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["isDuplicate"], true);
    assert_eq!(server.storage.upload_count(), 1);
}

#[tokio::test]
async fn raw_and_data_uri_payloads_share_one_stored_object() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    let bytes = b"identical image bytes";
    let (_, uploaded) = server
        .post(
            "/api/upload/image",
            Some(&token),
            json!({"imageData": data_uri(bytes)}),
        )
        .await;

    // The same bytes hashed outside the data-URI envelope give the same
    // storage key.
    let hash = backroom_core::ContentHash::compute(bytes);
    assert_eq!(
        uploaded["storageKey"],
        backroom_core::storage_key_for(&hash)
    );
}

#[tokio::test]
async fn delete_image_endpoint_destroys_and_404s_when_absent() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    let (_, uploaded) = server
        .post(
            "/api/upload/image",
            Some(&token),
            json!({"imageData": data_uri(b"bytes")}),
        )
        .await;
    let key = uploaded["storageKey"].as_str().unwrap();

    let (status, body) = server
        .delete(&format!("/api/upload/image/{key}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
    assert_eq!(body["storageKey"], key);

    // A second delete is a 404, not a silent success.
    let (status, _) = server
        .delete(&format!("/api/upload/image/{key}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
