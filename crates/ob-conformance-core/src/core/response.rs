// crates/ob-conformance-core/src/core/response.rs
// ============================================================================
// Module: HTTP Response Snapshot
// Description: Transport-neutral view of a response from the system under test.
// Purpose: Give validators a stable response shape independent of the client.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`HttpResponse`] is what executors produce and validators consume. It
//! carries no client types, so schema checks and test case matches can run
//! against recorded or synthetic responses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Captured HTTP response.
///
/// # Invariants
/// - Header names are stored lower-case.
/// - `path` is the request path without scheme, host, or query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Request method, upper-case.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status code.
    pub status_code: u16,
    /// Response headers keyed by lower-case name.
    pub headers: BTreeMap<String, String>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Time between sending the request and reading the full body.
    pub elapsed: Duration,
}

impl HttpResponse {
    /// Creates a response with no headers or body.
    #[must_use]
    pub fn new(method: &str, path: &str, status_code: u16) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            status_code,
            ..Self::default()
        }
    }

    /// Adds a header, normalizing the name to lower-case.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Returns the `Content-Type` header, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns true when the body is empty or whitespace only.
    #[must_use]
    pub fn body_is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }
}
