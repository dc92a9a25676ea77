//! Integration tests for POST /api/search

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use leadgen_common::config::Integrations;
use leadgen_hook::store::MemoryStore;
use leadgen_hook::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(discord_webhook_url: Option<String>) -> Router {
    let integrations = Integrations {
        discord_webhook_url,
        ..Default::default()
    };
    build_router(AppState::new(Arc::new(MemoryStore::new()), integrations))
}

async fn post_search(app: Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/search")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_search_forwarded_to_discord() {
    let discord = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_partial_json(json!({
            "embeds": [{
                "title": "People Search Query",
                "color": 8531219,
                "footer": {"text": "ArchiVintage People Search"}
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&discord)
        .await;

    let app = app_for(Some(format!("{}/webhook", discord.uri())));
    let (status, body) = post_search(app, r#"{"personName":"Jane","hasEmail":true}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Search data sent successfully to Discord"})
    );
}

#[tokio::test]
async fn test_invalid_field_type_is_400() {
    let (status, body) = post_search(app_for(None), r#"{"personName":42,"hasEmail":"yes"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid search data");
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["path"], json!(["personName"]));
}

#[tokio::test]
async fn test_missing_discord_url_is_500() {
    let (status, body) = post_search(app_for(None), r#"{"personName":"Jane"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Discord webhook URL not configured");
}

#[tokio::test]
async fn test_discord_rejection_is_500_with_detail() {
    let discord = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad embed"))
        .mount(&discord)
        .await;

    let (status, body) = post_search(app_for(Some(discord.uri())), "{}").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Discord webhook error: 400 - bad embed");
}
