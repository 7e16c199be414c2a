//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP transport that can return scripted
//! chunk streams, errors, or channel-fed streams for testing purposes.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a stream of byte chunks, then end-of-stream
    Stream(Vec<Bytes>),
    /// Return an error instead of opening the stream
    Error(HttpError),
    /// Return a stream that is fed from a channel at test pace
    Channel(Arc<Mutex<Option<mpsc::UnboundedReceiver<Result<Bytes, HttpError>>>>>),
}

/// Mock HTTP client for testing.
///
/// This client can be configured to return specific streams for URLs,
/// allowing tests to verify transport interactions without network access.
///
/// # Example
///
/// ```ignore
/// use evsource::adapters::mock::{MockHttpClient, MockResponse};
/// use evsource::traits::{Headers, HttpClient};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "https://api.example.com/events",
///     MockResponse::Stream(vec![Bytes::from_static(b"data: {\"ok\":true}\n")]),
/// );
///
/// let stream = client.get_stream("https://api.example.com/events", &Headers::new()).await?;
///
/// let requests = client.get_requests();
/// assert_eq!(requests.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a response for a specific URL.
    ///
    /// The URL is matched exactly, then by prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Set a channel-fed stream for a URL and return the feeding end.
    ///
    /// Chunks sent on the returned sender appear on the response stream;
    /// dropping the sender ends the stream. Each configured channel can be
    /// consumed by exactly one request.
    pub fn set_stream_channel(&self, url: &str) -> mpsc::UnboundedSender<Result<Bytes, HttpError>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.set_response(url, MockResponse::Channel(Arc::new(Mutex::new(Some(rx)))));
        tx
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Record a request.
    fn record_request(&self, method: &str, url: &str, headers: &Headers) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
        });
    }

    /// Get the response for a URL.
    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        // First try exact match
        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        // Then try prefix match (for URL patterns)
        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        None
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        self.record_request("GET", url, headers);

        match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => {
                let stream = stream::iter(chunks.into_iter().map(Ok));
                Ok(Box::pin(stream))
            }
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Channel(slot)) => {
                let rx = slot.lock().unwrap().take().ok_or_else(|| {
                    HttpError::Other("channel stream already consumed".to_string())
                })?;
                let stream = stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                });
                Ok(Box::pin(stream))
            }
            None => Err(HttpError::Other(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[test]
    fn test_mock_http_client_new() {
        let client = MockHttpClient::new();
        assert!(client.get_requests().is_empty());
    }

    #[test]
    fn test_mock_http_client_default() {
        let client = MockHttpClient::default();
        assert!(client.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_stream_scripted_chunks() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/events",
            MockResponse::Stream(vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")]),
        );

        let mut stream = client
            .get_stream("https://example.com/events", &Headers::new())
            .await
            .unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap(), Bytes::from("one"));
        assert_eq!(stream.next().await.unwrap().unwrap(), Bytes::from("two"));
        assert!(stream.next().await.is_none());

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "https://example.com/events");
    }

    #[tokio::test]
    async fn test_get_stream_error() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/denied",
            MockResponse::Error(HttpError::ServerError {
                status: 401,
                message: "Unauthorized".to_string(),
            }),
        );

        let result = client
            .get_stream("https://example.com/denied", &Headers::new())
            .await;
        assert!(matches!(
            result,
            Err(HttpError::ServerError { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_stream_no_response_configured() {
        let client = MockHttpClient::new();
        let result = client
            .get_stream("https://example.com/missing", &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::Other(_))));
    }

    #[tokio::test]
    async fn test_get_stream_prefix_match() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/",
            MockResponse::Stream(vec![Bytes::from_static(b"x")]),
        );

        let result = client
            .get_stream("https://example.com/anything", &Headers::new())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_channel_stream_feeds_and_closes() {
        let client = MockHttpClient::new();
        let tx = client.set_stream_channel("https://example.com/live");

        let mut stream = client
            .get_stream("https://example.com/live", &Headers::new())
            .await
            .unwrap();

        tx.send(Ok(Bytes::from_static(b"chunk"))).unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), Bytes::from("chunk"));

        drop(tx);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_channel_stream_single_consumer() {
        let client = MockHttpClient::new();
        let _tx = client.set_stream_channel("https://example.com/live");

        let first = client
            .get_stream("https://example.com/live", &Headers::new())
            .await;
        assert!(first.is_ok());

        let second = client
            .get_stream("https://example.com/live", &Headers::new())
            .await;
        assert!(matches!(second, Err(HttpError::Other(_))));
    }

    #[test]
    fn test_clear_requests() {
        let client = MockHttpClient::new();
        client.record_request("GET", "https://example.com", &Headers::new());
        assert_eq!(client.get_requests().len(), 1);
        client.clear_requests();
        assert!(client.get_requests().is_empty());
    }
}
