//! Request executor tests against a stubbed HTTP server.

use serde_json::{json, Value};
use webfetch::{ApiClient, ApiError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri(), "test-key".to_string(), "webfetch-tests/0.1").unwrap()
}

#[tokio::test]
async fn test_post_sends_bearer_body_and_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scrape"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("user-agent", "webfetch-tests/0.1"))
        .and(body_json(json!({"url": "https://example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .post("/v2/scrape", &json!({"url": "https://example.com"}))
        .await
        .unwrap();

    assert_eq!(result, json!({"success": true}));
}

#[tokio::test]
async fn test_non_success_status_carries_code_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/crawl/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"not found"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get("/v2/crawl/missing").await.unwrap_err();

    assert!(matches!(err, ApiError::Api { .. }));
    let message = err.to_string();
    assert!(message.contains("404"), "missing status code: {message}");
    assert!(
        message.contains(r#"{"error":"not found"}"#),
        "missing body: {message}"
    );
}

#[tokio::test]
async fn test_plain_text_success_body_passes_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text ok"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.post("/search", &json!({"query": "rust"})).await.unwrap();

    assert_eq!(result, Value::String("plain text ok".to_string()));
}

#[tokio::test]
async fn test_get_sends_no_body_or_content_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/crawl/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "completed"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get("/v2/crawl/job-1").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.is_empty());
    assert!(requests[0].headers.get("content-type").is_none());
    assert!(requests[0].headers.get("content-length").is_none());
}

// The end-to-end contract: a scrape-style request echoes the service's
// JSON back pretty-printed, byte for byte.
#[tokio::test]
async fn test_scrape_response_pretty_prints_exactly() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/scrape"))
        .and(body_json(json!({"url": "https://example.com"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .post("/v2/scrape", &json!({"url": "https://example.com"}))
        .await
        .unwrap();

    let printed = serde_json::to_string_pretty(&result).unwrap();
    let expected = serde_json::to_string_pretty(&json!({"success": true, "data": {}})).unwrap();
    assert_eq!(printed, expected);
}
