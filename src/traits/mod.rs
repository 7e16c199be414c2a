//! Trait abstractions for dependency injection and testability.
//!
//! This module provides trait-based abstractions for the transport layer,
//! enabling dependency injection, mocking, and better testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - streaming HTTP transport (GET with incremental body)

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError};
