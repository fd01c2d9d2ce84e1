//! Product CRUD and image lifecycle integration tests.

mod common;

use axum::http::StatusCode;
use backroom_storage::AssetStore;
use common::server::{TEST_BASE_URL, TestServer};
use serde_json::json;

fn image_url(name: &str) -> String {
    format!("{TEST_BASE_URL}/products/{name}.jpg")
}

async fn create_product(
    server: &TestServer,
    token: &str,
    images: serde_json::Value,
) -> serde_json::Value {
    let (status, body) = server
        .post(
            "/api/products",
            Some(token),
            json!({
                "name": "Blue Rug",
                "description": "Hand woven",
                "category": "rugs",
                "material": "cotton",
                "price": 49.0,
                "stock": 3,
                "images": images,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body
}

#[tokio::test]
async fn create_requires_admin_and_required_fields() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    // No token at all.
    let (status, _) = server
        .post("/api/products", None, json!({"name": "X"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Non-admin token.
    let user_token = server.token_for(uuid::Uuid::new_v4(), "user");
    let (status, _) = server
        .post("/api/products", Some(&user_token), json!({"name": "X"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Missing required fields come back as field-level 400s.
    let (status, body) = server
        .post("/api/products", Some(&token), json!({"name": "X"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("description"));
}

#[tokio::test]
async fn create_normalizes_images_to_single_primary() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    let body = create_product(
        &server,
        &token,
        json!([
            {"url": image_url("a"), "isPrimary": true},
            {"url": image_url("b"), "isPrimary": true},
            image_url("c"),
        ]),
    )
    .await;

    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 3);
    let primaries: Vec<bool> = images
        .iter()
        .map(|img| img["isPrimary"].as_bool().unwrap())
        .collect();
    assert_eq!(primaries, vec![true, false, false]);
    assert_eq!(images[2]["alt"], "Product image 3");
}

#[tokio::test]
async fn update_replaces_list_and_deletes_dropped_assets() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    // Put real objects behind URLs A and B so cleanup has something to hit.
    for name in ["a", "b"] {
        let payload = backroom_core::ImagePayload::Bytes(bytes::Bytes::from(name.to_string()));
        server
            .state
            .storage
            .upload(
                &payload,
                &format!("products/{name}"),
                &backroom_core::TransformOptions::default(),
            )
            .await
            .unwrap();
    }

    let created = create_product(
        &server,
        &token,
        json!([image_url("a"), image_url("b")]),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let destroys_before = server.storage.destroy_count();

    // Replace [A, B] with [B, C]: exactly one destroy, for A's key.
    let (status, body) = server
        .put(
            &format!("/api/products/{id}"),
            Some(&token),
            json!({"images": [image_url("b"), image_url("c")]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");

    assert_eq!(server.storage.destroy_count() - destroys_before, 1);
    assert_eq!(server.storage.destroyed_keys(), vec!["products/a".to_string()]);

    // The persisted list was replaced wholesale and re-normalized.
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["url"], image_url("b"));
    assert_eq!(images[0]["isPrimary"], true);
    assert_eq!(images[1]["url"], image_url("c"));
    assert_eq!(images[1]["isPrimary"], false);

    // Cleanup outcome is reported, not thrown.
    assert_eq!(body["cleanup"]["deleted"].as_array().unwrap().len(), 1);
    assert!(body["cleanup"]["failed"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_survives_partial_cleanup_failure() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    // One URL the store cannot parse back into a key.
    let foreign = "https://elsewhere.example.com/foreign.jpg";
    let created = create_product(&server, &token, json!([foreign, image_url("b")])).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = server
        .put(
            &format!("/api/products/{id}"),
            Some(&token),
            json!({"images": [image_url("b")]}),
        )
        .await;

    // The update persists even though cleanup could not process the URL.
    assert_eq!(status, StatusCode::OK);
    let failed = body["cleanup"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["url"], foreign);

    let (status, fetched) = server.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let images = fetched["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["url"], image_url("b"));
}

#[tokio::test]
async fn update_without_images_field_keeps_list_untouched() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    let created = create_product(&server, &token, json!([image_url("a")])).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = server
        .put(&format!("/api/products/{id}"), Some(&token), json!({"stock": 7}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], 7);
    assert_eq!(body["images"].as_array().unwrap().len(), 1);
    assert_eq!(server.storage.destroy_count(), 0);
    assert!(body.get("cleanup").is_none());
}

#[tokio::test]
async fn delete_cleans_up_all_images_then_removes_record() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    for name in ["a", "b"] {
        let payload = backroom_core::ImagePayload::Bytes(bytes::Bytes::from(name.to_string()));
        server
            .state
            .storage
            .upload(
                &payload,
                &format!("products/{name}"),
                &backroom_core::TransformOptions::default(),
            )
            .await
            .unwrap();
    }

    let created = create_product(
        &server,
        &token,
        json!([image_url("a"), image_url("b")]),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = server
        .delete(&format!("/api/products/{id}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
    assert_eq!(server.storage.destroy_count(), 2);

    let (status, _) = server.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_and_paginates() {
    let server = TestServer::new().await;
    let (_, token) = server.seed_admin("root@example.com", "hunter2").await;

    for name in ["Blue Rug", "Red Rug", "Green Towel"] {
        server
            .post(
                "/api/products",
                Some(&token),
                json!({
                    "name": name,
                    "description": "d",
                    "category": if name.contains("Rug") { "rugs" } else { "towels" },
                    "material": "cotton",
                    "price": 10.0,
                    "stock": 1,
                }),
            )
            .await;
    }

    let (status, body) = server.get("/api/products?search=rug", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = server.get("/api/products?page=1&limit=2", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNextPage"], true);
}
