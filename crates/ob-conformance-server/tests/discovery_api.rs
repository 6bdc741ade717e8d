// crates/ob-conformance-server/tests/discovery_api.rs
// ============================================================================
// Module: Discovery API Tests
// Description: End-to-end tests for the discovery validation routes.
// Purpose: Validate success, failure list, and parse error responses.
// Dependencies: ob-conformance-server, reqwest, tokio
// ============================================================================

//! ## Overview
//! Submits discovery documents to the validate and fields routes and checks
//! the JSON envelopes returned for each outcome.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::TestServer;
use common::discovery_document;
use serde_json::Value;
use serde_json::json;

/// Parses a response body.
fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

// ============================================================================
// SECTION: Validate
// ============================================================================

#[tokio::test]
async fn valid_document_returns_empty_object() {
    let server = TestServer::start().await;

    let (status, content_type, body) = server.post("/api/discovery-model/validate", discovery_document()).await;

    assert_eq!(status, 200);
    assert_eq!(content_type, "application/json; charset=UTF-8");
    assert_eq!(parse(&body), json!({}));
}

#[tokio::test]
async fn invalid_document_lists_every_failure() {
    let server = TestServer::start().await;
    let mut document = parse(&discovery_document());
    document["discoveryModel"]["name"] = json!("");
    document["discoveryModel"]["discoveryVersion"] = json!("v9.9.9");

    let (status, _, body) = server.post("/api/discovery-model/validate", document.to_string()).await;

    assert_eq!(status, 400);
    assert_eq!(
        parse(&body),
        json!({"error": [
            {"key": "DiscoveryModel.Name", "error": "Field validation for 'Name' failed on the 'required' tag"},
            {"key": "DiscoveryModel.DiscoveryVersion", "error": "DiscoveryVersion 'v9.9.9' not in list of supported versions"}
        ]})
    );
}

#[tokio::test]
async fn malformed_document_is_a_single_error_message() {
    let server = TestServer::start().await;

    let (status, _, body) = server.post("/api/discovery-model/validate", "{\"discoveryModel\": [").await;

    assert_eq!(status, 400);
    assert!(parse(&body)["error"].as_str().unwrap().starts_with("discovery parse error"));
}

// ============================================================================
// SECTION: Fields
// ============================================================================

#[tokio::test]
async fn fields_route_returns_required_configuration() {
    let server = TestServer::start().await;

    let (status, _, body) = server.post("/api/discovery-model/fields", discovery_document()).await;

    assert_eq!(status, 200);
    let names: Vec<String> = parse(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["field_name"].as_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&"client_id".to_string()));
    assert!(names.contains(&"resource_ids.account_ids".to_string()));
}

#[tokio::test]
async fn fields_route_rejects_invalid_documents() {
    let server = TestServer::start().await;
    let mut document = parse(&discovery_document());
    document["discoveryModel"]["discoveryItems"] = json!([]);

    let (status, _, body) = server.post("/api/discovery-model/fields", document.to_string()).await;

    assert_eq!(status, 400);
    assert_eq!(parse(&body)["error"][0]["key"], "DiscoveryModel.DiscoveryItems");
}
