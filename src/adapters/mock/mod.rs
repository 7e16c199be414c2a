//! Mock implementations for testing.
//!
//! These test doubles implement the traits from `crate::traits` and let
//! the full client be exercised without network access.

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
