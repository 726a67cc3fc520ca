//! Integration tests for the lightspeed client using wiremock.

use futures::StreamExt;
use lightspeed_client::LightspeedClient;
use lightspeed_types::{ApiError, ConversationApi, ConversationId, CreateMessageRequest};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> CreateMessageRequest {
    CreateMessageRequest {
        conversation_id: "conv-1".into(),
        model: "granite3-dense:8b".into(),
        prompt: "What is Backstage?".into(),
    }
}

#[tokio::test]
async fn history_is_fetched_and_decoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations/conv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "kwargs": { "content": "hi" } },
            { "kwargs": { "content": "hello", "response_metadata": { "model": "granite", "created_at": 1714566600 } } },
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = LightspeedClient::new().base_url(mock_server.uri());
    let records = client
        .conversation_messages(&ConversationId::new("conv-1"))
        .await
        .expect("history");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].content, "hi");
    assert_eq!(records[1].model.as_deref(), Some("granite"));
    assert_eq!(records[1].timestamp.map(|t| t.timestamp()), Some(1_714_566_600));
}

#[tokio::test]
async fn history_id_is_percent_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations/user:default%2Fguest+abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = LightspeedClient::new().base_url(mock_server.uri());
    let records = client
        .conversation_messages(&ConversationId::new("user:default/guest+abc"))
        .await
        .expect("history");
    assert!(records.is_empty());
}

#[tokio::test]
async fn history_not_found_maps_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such conversation"))
        .mount(&mock_server)
        .await;

    let client = LightspeedClient::new().base_url(mock_server.uri());
    let err = client
        .conversation_messages(&ConversationId::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(msg) if msg == "no such conversation"));
}

#[tokio::test]
async fn history_non_json_body_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations/conv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let client = LightspeedClient::new().base_url(mock_server.uri());
    let err = client
        .conversation_messages(&ConversationId::new("conv-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn query_sends_expected_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .and(body_json(json!({
            "conversation_id": "conv-1",
            "model": "granite3-dense:8b",
            "query": "What is Backstage?",
            "serverURL": "http://ollama:11434/v1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = LightspeedClient::new()
        .base_url(mock_server.uri())
        .server_url("http://ollama:11434/v1");
    let result = client.create_message(request()).await;
    assert!(result.is_ok(), "expected Ok, got: {:?}", result.err());
}

#[tokio::test]
async fn query_streams_raw_body() {
    let mock_server = MockServer::start().await;
    let wire = r#"{"response":{"kwargs":{"content":"Hel"}}}{"response":{"kwargs":{"content":"lo"}}}"#;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(wire))
        .mount(&mock_server)
        .await;

    let client = LightspeedClient::new().base_url(mock_server.uri());
    let mut body = client.create_message(request()).await.expect("stream");

    let mut received = Vec::new();
    while let Some(chunk) = body.next().await {
        received.extend_from_slice(&chunk.expect("chunk"));
    }
    assert_eq!(received, wire.as_bytes());
}

#[tokio::test]
async fn query_server_error_maps_to_service_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model server down"))
        .mount(&mock_server)
        .await;

    let client = LightspeedClient::new().base_url(mock_server.uri());
    let err = client.create_message(request()).await.err().expect("error");
    assert!(matches!(err, ApiError::ServiceUnavailable(ref msg) if msg == "model server down"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn query_forbidden_maps_to_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(403).set_body_string("missing permission"))
        .mount(&mock_server)
        .await;

    let client = LightspeedClient::new().base_url(mock_server.uri());
    let err = client.create_message(request()).await.err().expect("error");
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let client = LightspeedClient::new().base_url("http://127.0.0.1:1");
    let err = client.create_message(request()).await.err().expect("error");
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn slow_history_reports_the_configured_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations/conv-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(std::time::Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let limit = std::time::Duration::from_millis(100);
    let client = LightspeedClient::new()
        .base_url(mock_server.uri())
        .request_timeout(Some(limit));
    let err = client
        .conversation_messages(&ConversationId::new("conv-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout(d) if d == limit), "got: {err:?}");
    assert!(err.is_retryable());
}
