//! Integration tests for the enrichment API proxies
//!
//! The upstream API is a wiremock server.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use leadgen_common::config::Integrations;
use leadgen_hook::store::MemoryStore;
use leadgen_hook::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(clay_webhook_url: Option<String>) -> Router {
    let integrations = Integrations {
        clay_webhook_url,
        public_origin: Some("https://leads.example.test".to_string()),
        ..Default::default()
    };
    build_router(AppState::new(Arc::new(MemoryStore::new()), integrations))
}

async fn call(app: Router, method: &str, uri: &str, body: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn text_of(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_plain_proxy_relays_status_and_body() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_json(json!({"industry": "Retail"})))
        .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = app_for(Some(format!("{}/hook", upstream.uri())));
    let response = call(app, "POST", "/api/clay-proxy", r#"{"industry":"Retail"}"#).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(text_of(response).await, "queued");
}

#[tokio::test]
async fn test_upstream_error_status_is_passed_through() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad table"))
        .mount(&upstream)
        .await;

    let app = app_for(Some(upstream.uri()));
    let response = call(app, "POST", "/api/clay-proxy", "{}").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(text_of(response).await, "bad table");
}

#[tokio::test]
async fn test_mcp_proxy_sends_origin_and_answers_with_cors() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("origin", "https://leads.example.test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = app_for(Some(upstream.uri()));
    let response = call(app, "POST", "/api/mcp-clay-proxy", "{}").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    assert_eq!(text_of(response).await, "ok");
}

#[tokio::test]
async fn test_mcp_proxy_rejects_options() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = app_for(Some(upstream.uri()));
    let response = call(app, "OPTIONS", "/api/mcp-clay-proxy", "").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = serde_json::from_str(&text_of(response).await).unwrap();
    assert_eq!(body, json!({"error": "Method not allowed"}));

}

#[tokio::test]
async fn test_missing_upstream_url_is_500() {
    let response = call(app_for(None), "POST", "/api/clay-proxy", "{}").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_str(&text_of(response).await).unwrap();
    assert_eq!(body["error"], "Clay webhook URL not configured");
}

#[tokio::test]
async fn test_unreachable_upstream_is_500() {
    // Nothing listens on port 9 (discard) in the test environment
    let response = call(
        app_for(Some("http://127.0.0.1:9/hook".to_string())),
        "POST",
        "/api/mcp-clay-proxy",
        "{}",
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_str(&text_of(response).await).unwrap();
    assert_eq!(body["error"], "Failed to proxy request to Clay API");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_proxy_rejects_get() {
    let response = call(app_for(None), "GET", "/api/clay-proxy", "").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let body: Value = serde_json::from_str(&text_of(response).await).unwrap();
    assert_eq!(body, json!({"error": "Method not allowed"}));

    for uri in ["/api/clay-proxy", "/api/mcp-clay-proxy"] {
        for verb in ["GET", "OPTIONS", "PUT"] {
            let response = call(app_for(None), verb, uri, "").await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{} {}", verb, uri);
            let body: Value = serde_json::from_str(&text_of(response).await).unwrap();
            assert_eq!(body, json!({"error": "Method not allowed"}));
        }

        // HEAD responses carry no body
        let response = call(app_for(None), "HEAD", uri, "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "HEAD {}", uri);
    }
}
