//! Tests for the production reqwest transport against a local mock server.

use futures_util::StreamExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use evsource::adapters::ReqwestHttpClient;
use evsource::traits::{Headers, HttpClient, HttpError};

async fn read_all(mut stream: evsource::traits::ByteStream) -> Vec<u8> {
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk.expect("chunk should be ok"));
    }
    body
}

#[tokio::test]
async fn test_get_stream_reads_event_body() {
    let server = MockServer::start().await;
    let body = "data: {\"success\":true,\"phase\":\"start\"}\n\ndata: {\"success\":true,\"phase\":\"end\"}\n\n";
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new();
    let stream = client
        .get_stream(&format!("{}/events", server.uri()), &Headers::new())
        .await
        .expect("stream should open");

    assert_eq!(read_all(stream).await, body.as_bytes());
}

#[tokio::test]
async fn test_get_stream_forwards_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header("Authorization", "Bearer tok-123"))
        .and(header("Accept", "text/event-stream"))
        .and(header("Cache-Control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = Headers::new();
    headers.insert("Authorization".to_string(), "Bearer tok-123".to_string());
    headers.insert("Accept".to_string(), "text/event-stream".to_string());
    headers.insert("Cache-Control".to_string(), "no-cache".to_string());

    let client = ReqwestHttpClient::new();
    let result = client
        .get_stream(&format!("{}/events", server.uri()), &headers)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_get_stream_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new();
    let result = client
        .get_stream(&format!("{}/events", server.uri()), &Headers::new())
        .await;

    match result {
        Err(HttpError::ServerError { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        Err(other) => panic!("expected ServerError, got {other:?}"),
        Ok(_) => panic!("expected ServerError, got an open stream"),
    }
}

#[tokio::test]
async fn test_get_stream_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new();
    let result = client
        .get_stream(&format!("{}/events", server.uri()), &Headers::new())
        .await;
    assert!(matches!(
        result,
        Err(HttpError::ServerError { status: 500, .. })
    ));
}
