// crates/ob-conformance-core/tests/discovery_validator.rs
// ============================================================================
// Module: Discovery Validator Tests
// Description: Rule-by-rule validation of discovery documents.
// Purpose: Pin failure keys, messages, and ordering for every discovery rule.
// Dependencies: ob-conformance-core
// ============================================================================

//! ## Overview
//! Each test replaces one field of a valid discovery document and asserts the
//! exact failures reported, using a stub conditionality checker.

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

use common::SCHEMA_VERSION;
use common::SPEC_URL;
use common::StubChecker;
use common::discovery_stub;
use ob_conformance_core::DiscoveryError;
use ob_conformance_core::Endpoint;
use ob_conformance_core::ValidationFailure;
use ob_conformance_core::validate_discovery_json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn assert_failures(checker: &StubChecker, document: &str, expected: &[(&str, &str)]) {
    let (passed, failures) = validate_discovery_json(checker, document).unwrap();
    let expected = expected
        .iter()
        .map(|(key, error)| ValidationFailure::new(*key, *error))
        .collect::<Vec<_>>();
    assert_eq!(failures, expected);
    assert_eq!(passed, expected.is_empty());
}

// ============================================================================
// SECTION: Structural Rules
// ============================================================================

#[test]
fn name_missing_returns_failure() {
    assert_failures(&StubChecker::default(), &discovery_stub("name", ""), &[(
        "DiscoveryModel.Name",
        "Field validation for 'Name' failed on the 'required' tag",
    )]);
}

#[test]
fn description_missing_returns_failure() {
    assert_failures(&StubChecker::default(), &discovery_stub("description", ""), &[(
        "DiscoveryModel.Description",
        "Field validation for 'Description' failed on the 'required' tag",
    )]);
}

#[test]
fn discovery_version_missing_returns_failure() {
    assert_failures(&StubChecker::default(), &discovery_stub("version", ""), &[(
        "DiscoveryModel.DiscoveryVersion",
        "Field validation for 'DiscoveryVersion' failed on the 'required' tag",
    )]);
}

#[test]
fn unsupported_discovery_version_returns_failure() {
    assert_failures(&StubChecker::all_present(), &discovery_stub("version", "v9.9.9"), &[(
        "DiscoveryModel.DiscoveryVersion",
        "DiscoveryVersion 'v9.9.9' not in list of supported versions",
    )]);
}

#[test]
fn discovery_items_missing_returns_failure() {
    assert_failures(&StubChecker::default(), &discovery_stub("discoveryItems", ""), &[(
        "DiscoveryModel.DiscoveryItems",
        "Field validation for 'DiscoveryItems' failed on the 'required' tag",
    )]);
}

#[test]
fn discovery_items_empty_returns_failure() {
    assert_failures(&StubChecker::default(), &discovery_stub("discoveryItems", "[]"), &[(
        "DiscoveryModel.DiscoveryItems",
        "Field validation for 'DiscoveryItems' failed on the 'gt' tag",
    )]);
}

#[test]
fn api_specification_missing_returns_one_failure_per_field() {
    assert_failures(&StubChecker::default(), &discovery_stub("apiSpecification", ""), &[
        (
            "DiscoveryModel.DiscoveryItems[0].APISpecification.Name",
            "Field validation for 'Name' failed on the 'required' tag",
        ),
        (
            "DiscoveryModel.DiscoveryItems[0].APISpecification.URL",
            "Field validation for 'URL' failed on the 'required' tag",
        ),
        (
            "DiscoveryModel.DiscoveryItems[0].APISpecification.Version",
            "Field validation for 'Version' failed on the 'required' tag",
        ),
        (
            "DiscoveryModel.DiscoveryItems[0].APISpecification.SchemaVersion",
            "Field validation for 'SchemaVersion' failed on the 'required' tag",
        ),
    ]);
}

#[test]
fn unknown_schema_version_returns_failure() {
    assert_failures(
        &StubChecker::default(),
        &discovery_stub("schemaVersion", "http://example.com/bad-schema"),
        &[(
            "DiscoveryModel.DiscoveryItems[0].APISpecification.SchemaVersion",
            "'SchemaVersion' not supported by suite 'http://example.com/bad-schema'",
        )],
    );
}

#[test]
fn registry_name_mismatch_returns_failure() {
    let expected = format!(
        "'Name' should be 'Account and Transaction API Specification' when schemaVersion is '{SCHEMA_VERSION}'"
    );
    assert_failures(&StubChecker::all_present(), &discovery_stub("specName", "Bad Spec Name"), &[(
        "DiscoveryModel.DiscoveryItems[0].APISpecification.Name",
        expected.as_str(),
    )]);
}

#[test]
fn registry_version_mismatch_returns_failure() {
    let expected = format!("'Version' should be 'v3.0' when schemaVersion is '{SCHEMA_VERSION}'");
    assert_failures(&StubChecker::all_present(), &discovery_stub("specVersion", "v9.9.9"), &[(
        "DiscoveryModel.DiscoveryItems[0].APISpecification.Version",
        expected.as_str(),
    )]);
}

#[test]
fn registry_url_mismatch_returns_failure() {
    let expected = format!("'URL' should be '{SPEC_URL}' when schemaVersion is '{SCHEMA_VERSION}'");
    assert_failures(&StubChecker::all_present(), &discovery_stub("specURL", "http://example.com/bad-url"), &[(
        "DiscoveryModel.DiscoveryItems[0].APISpecification.URL",
        expected.as_str(),
    )]);
}

#[test]
fn empty_endpoints_returns_failure() {
    assert_failures(&StubChecker::default(), &discovery_stub("endpoints", "[]"), &[(
        "DiscoveryModel.DiscoveryItems[0].Endpoints",
        "Field validation for 'Endpoints' failed on the 'gt' tag",
    )]);
}

#[test]
fn missing_endpoints_returns_failure() {
    assert_failures(&StubChecker::default(), &discovery_stub("endpoints", ""), &[(
        "DiscoveryModel.DiscoveryItems[0].Endpoints",
        "Field validation for 'Endpoints' failed on the 'required' tag",
    )]);
}

#[test]
fn structural_failures_accumulate_across_fields() {
    let document = discovery_stub("name", "").replace("v0.1.0", "v9.9.9");
    assert_failures(&StubChecker::default(), &document, &[
        ("DiscoveryModel.Name", "Field validation for 'Name' failed on the 'required' tag"),
        ("DiscoveryModel.DiscoveryVersion", "DiscoveryVersion 'v9.9.9' not in list of supported versions"),
    ]);
}

// ============================================================================
// SECTION: Conditionality Rules
// ============================================================================

#[test]
fn is_present_error_is_reported_per_endpoint() {
    let checker = StubChecker {
        is_present_err: Some("some error message".to_string()),
        ..StubChecker::default()
    };
    assert_failures(&checker, &discovery_stub("", ""), &[
        ("DiscoveryModel.DiscoveryItems[0].Endpoints[0]", "some error message"),
        ("DiscoveryModel.DiscoveryItems[0].Endpoints[1]", "some error message"),
    ]);
}

#[test]
fn endpoints_not_present_are_invalid() {
    assert_failures(&StubChecker::default(), &discovery_stub("", ""), &[
        (
            "DiscoveryModel.DiscoveryItems[0].Endpoints[0]",
            "Invalid endpoint Method='POST', Path='/account-access-consents'",
        ),
        (
            "DiscoveryModel.DiscoveryItems[0].Endpoints[1]",
            "Invalid endpoint Method='GET', Path='/accounts/{AccountId}/balances'",
        ),
    ]);
}

#[test]
fn endpoints_present_pass() {
    assert_failures(&StubChecker::all_present(), &discovery_stub("", ""), &[]);
}

#[test]
fn missing_mandatory_error_is_keyed_to_collection() {
    let checker = StubChecker {
        is_present: true,
        missing_mandatory_err: Some("the error message".to_string()),
        ..StubChecker::default()
    };
    assert_failures(&checker, &discovery_stub("", ""), &[(
        "DiscoveryModel.DiscoveryItems[0].Endpoints",
        "the error message",
    )]);
}

#[test]
fn missing_mandatory_endpoints_are_keyed_to_collection() {
    let checker = StubChecker {
        is_present: true,
        missing_mandatory: vec![
            Endpoint::new("GET", "/account-access-consents/{ConsentId}"),
            Endpoint::new("DELETE", "/account-access-consents/{ConsentId}"),
        ],
        ..StubChecker::default()
    };
    assert_failures(&checker, &discovery_stub("", ""), &[
        (
            "DiscoveryModel.DiscoveryItems[0].Endpoints",
            "Missing mandatory endpoint Method='GET', Path='/account-access-consents/{ConsentId}'",
        ),
        (
            "DiscoveryModel.DiscoveryItems[0].Endpoints",
            "Missing mandatory endpoint Method='DELETE', Path='/account-access-consents/{ConsentId}'",
        ),
    ]);
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn malformed_json_is_an_error_not_a_failure() {
    let err = validate_discovery_json(&StubChecker::default(), "{\"discoveryModel\": [").unwrap_err();
    assert!(matches!(err, DiscoveryError::Parse(_)));
}

#[test]
fn absent_and_empty_collections_are_distinguished() {
    let absent = ob_conformance_core::Model::from_json(&discovery_stub("endpoints", "")).unwrap();
    let empty = ob_conformance_core::Model::from_json(&discovery_stub("endpoints", "[]")).unwrap();
    assert!(absent.discovery_model.items()[0].endpoints.is_none());
    assert_eq!(empty.discovery_model.items()[0].endpoints, Some(Vec::new()));
}

#[test]
fn validation_is_deterministic() {
    let document = discovery_stub("", "");
    let first = validate_discovery_json(&StubChecker::default(), &document).unwrap();
    let second = validate_discovery_json(&StubChecker::default(), &document).unwrap();
    assert_eq!(first, second);
}
