use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use linkvault::models::share_link::ShareLink;
use linkvault::services::store::ShareLinkStore;

mod common;
use common::*;

/// Enable sharing, view the shared page, disable sharing, view again
#[tokio::test]
async fn test_share_lifecycle() {
    let app = setup_test_app().await;
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;

    let first = add_content(&app, &alice, "First", "https://first.example").await;
    let second = add_content(&app, &alice, "Second", "https://second.example").await;
    add_content(&app, &bob, "Bob only", "https://bob.example").await;

    let (status, body) = send(&app, "POST", "/api/v1/brain/share", Some(&alice), Some(json!({ "share": true }))).await;
    assert_eq!(status, StatusCode::OK);
    let hash = body["hash"].as_str().unwrap().to_string();
    assert_eq!(hash.len(), 10);
    assert!(hash.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));

    // Enabling again hands back the same link
    let (_, again) = send(&app, "POST", "/api/v1/brain/share", Some(&alice), Some(json!({ "share": true }))).await;
    assert_eq!(again["hash"], hash);

    // Anyone can view it, no auth required
    let (status, shared) = send(&app, "GET", &format!("/api/v1/brain/{}", hash), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared["username"], "alice@example.com");
    let content = shared["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["id"], second["id"]);
    assert_eq!(content[1]["id"], first["id"]);

    let (status, body) = send(&app, "POST", "/api/v1/brain/share", Some(&alice), Some(json!({ "share": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Removed link");

    let (status, body) = send(&app, "GET", &format!("/api/v1/brain/{}", hash), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "SHARE_LINK_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/brain/abcdefghij", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Share link is invalid or expired");
}

#[tokio::test]
async fn test_disable_without_link_is_ok() {
    let app = setup_test_app().await;
    let carol = signup(&app, "carol@example.com").await;

    let (status, _) = send(&app, "POST", "/api/v1/brain/share", Some(&carol), Some(json!({ "share": false }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reenable_issues_a_working_link() {
    let app = setup_test_app().await;
    let dave = signup(&app, "dave@example.com").await;

    let (_, first) = send(&app, "POST", "/api/v1/brain/share", Some(&dave), Some(json!({ "share": true }))).await;
    send(&app, "POST", "/api/v1/brain/share", Some(&dave), Some(json!({ "share": false }))).await;
    let (_, second) = send(&app, "POST", "/api/v1/brain/share", Some(&dave), Some(json!({ "share": true }))).await;

    let token = second["hash"].as_str().unwrap();
    let (status, shared) = send(&app, "GET", &format!("/api/v1/brain/{}", token), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared["username"], "dave@example.com");
    assert!(shared["content"].as_array().unwrap().is_empty());

    if first["hash"] != second["hash"] {
        let old = first["hash"].as_str().unwrap();
        let (status, _) = send(&app, "GET", &format!("/api/v1/brain/{}", old), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_share_toggle_requires_auth() {
    let app = setup_test_app().await;

    let (status, _) = send(&app, "POST", "/api/v1/brain/share", None, Some(json!({ "share": true }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", "/api/v1/brain/share", Some("not-a-session"), Some(json!({ "share": true }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_orphaned_link_reports_missing_owner() {
    let (app, store) = setup_test_app_with_store(test_config()).await;
    store
        .insert_share_link(ShareLink::new(Uuid::new_v4(), "orphan1234"))
        .await
        .unwrap();

    let (status, body) = send(&app, "GET", "/api/v1/brain/orphan1234", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "SHARE_OWNER_MISSING");
}

#[tokio::test]
async fn test_configured_token_shape() {
    let config = linkvault::utils::config::AppConfig {
        share_token_alphabet: "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".to_string(),
        share_token_length: 16,
        ..test_config()
    };
    let (app, _) = setup_test_app_with_store(config).await;
    let erin = signup(&app, "erin@example.com").await;

    let (_, body) = send(&app, "POST", "/api/v1/brain/share", Some(&erin), Some(json!({ "share": true }))).await;
    let hash = body["hash"].as_str().unwrap();
    assert_eq!(hash.len(), 16);
    assert!(hash.chars().all(|c| "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".contains(c)));
}

#[tokio::test]
async fn test_concurrent_enables_for_many_users_get_distinct_links() {
    let app = setup_test_app().await;
    let mut tokens = Vec::new();
    for i in 0..8 {
        tokens.push(signup(&app, &format!("user{}@example.com", i)).await);
    }

    let requests = tokens.iter().map(|token| {
        let app = app.clone();
        let token = token.clone();
        tokio::spawn(async move {
            send(&app, "POST", "/api/v1/brain/share", Some(&token), Some(json!({ "share": true }))).await
        })
    });

    let mut hashes = Vec::new();
    for handle in requests.collect::<Vec<_>>() {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        hashes.push(body["hash"].as_str().unwrap().to_string());
    }
    hashes.sort();
    hashes.dedup();
    assert_eq!(hashes.len(), 8);
}
