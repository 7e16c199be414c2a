//! HTTP client trait abstraction.
//!
//! Provides a trait-based abstraction for the streaming HTTP transport,
//! enabling dependency injection and mocking in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// A streaming HTTP response body, delivered as byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP client errors.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Server returned an error status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,
    /// IO error while reading the response body
    #[error("IO error: {0}")]
    Io(String),
    /// Other error
    #[error("HTTP error: {0}")]
    Other(String),
}

impl HttpError {
    /// Check whether this error represents a caller-initiated cancellation.
    ///
    /// Cancellation is part of normal teardown and must never be reported
    /// as a stream failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::Cancelled)
    }
}

/// Trait for the streaming HTTP transport.
///
/// This trait abstracts the single transport operation the event stream
/// client needs: a GET request whose response body is consumed
/// incrementally. Implementations include the production reqwest-based
/// client and a mock client for testing.
///
/// # Example
///
/// ```ignore
/// use evsource::traits::{Headers, HttpClient};
///
/// async fn open<C: HttpClient>(client: &C) -> Result<(), Box<dyn std::error::Error>> {
///     let stream = client.get_stream("https://api.example.com/events", &Headers::new()).await?;
///     // read chunks from `stream`
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request and return the response body as a byte stream.
    ///
    /// A non-success status is reported as [`HttpError::ServerError`]; the
    /// stream itself yields an error item if the body fails mid-read.
    ///
    /// # Arguments
    /// * `url` - The URL to request
    /// * `headers` - Request headers
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError>;
}
