// crates/ob-conformance-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared doubles and discovery fixtures for core tests.
// Purpose: Provide a stub conditionality checker and discovery documents.
// Dependencies: ob-conformance-core
// ============================================================================

//! ## Overview
//! Provides a configurable [`ConditionalityChecker`] double and a builder for
//! discovery documents with one field replaced.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use ob_conformance_core::ConditionalityChecker;
use ob_conformance_core::ConditionalityError;
use ob_conformance_core::Endpoint;

// ============================================================================
// SECTION: Conditionality Double
// ============================================================================

/// Conditionality checker returning stubbed answers.
#[derive(Debug, Clone, Default)]
pub struct StubChecker {
    /// Answer for every `is_present` call.
    pub is_present: bool,
    /// Error for every `is_present` call.
    pub is_present_err: Option<String>,
    /// Answer for `missing_mandatory`.
    pub missing_mandatory: Vec<Endpoint>,
    /// Error for `missing_mandatory`.
    pub missing_mandatory_err: Option<String>,
}

impl StubChecker {
    /// Checker that reports every endpoint present.
    pub fn all_present() -> Self {
        Self {
            is_present: true,
            ..Self::default()
        }
    }
}

impl ConditionalityChecker for StubChecker {
    fn is_optional(&self, _method: &str, _endpoint: &str, _spec: &str) -> Result<bool, ConditionalityError> {
        Ok(false)
    }

    fn is_mandatory(&self, method: &str, endpoint: &str, _spec: &str) -> Result<bool, ConditionalityError> {
        Ok(method == "POST" && endpoint == "/account-access-consents")
    }

    fn is_conditional(&self, _method: &str, _endpoint: &str, _spec: &str) -> Result<bool, ConditionalityError> {
        Ok(false)
    }

    fn is_present(&self, _method: &str, _endpoint: &str, _spec: &str) -> Result<bool, ConditionalityError> {
        match &self.is_present_err {
            Some(message) => Err(ConditionalityError(message.clone())),
            None => Ok(self.is_present),
        }
    }

    fn missing_mandatory(&self, _endpoints: &[Endpoint], _spec: &str) -> Result<Vec<Endpoint>, ConditionalityError> {
        match &self.missing_mandatory_err {
            Some(message) => Err(ConditionalityError(message.clone())),
            None => Ok(self.missing_mandatory.clone()),
        }
    }
}

// ============================================================================
// SECTION: Discovery Fixtures
// ============================================================================

/// Registered v3.0 account specification URL.
pub const SPEC_URL: &str =
    "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/642090641/Account+and+Transaction+API+Specification+-+v3.0";
/// Registered v3.0 account schema version.
pub const SCHEMA_VERSION: &str =
    "https://raw.githubusercontent.com/OpenBankingUK/read-write-api-specs/v3.0.0/dist/account-info-swagger.json";

/// Returns a discovery document with `field` replaced by `value`.
///
/// An empty `value` removes the field where that makes sense.
pub fn discovery_stub(field: &str, value: &str) -> String {
    let mut name = "ob-v3.0-generic";
    let mut description = "An Open Banking UK generic discovery template for v3.0 of Accounts and Payments.";
    let mut version = "v0.1.0";
    let mut spec_name = "Account and Transaction API Specification";
    let mut spec_url = SPEC_URL;
    let mut spec_version = "v3.0";
    let mut schema_version = SCHEMA_VERSION;
    let mut endpoints = r#", "endpoints": [
        {"method": "POST", "path": "/account-access-consents"},
        {"method": "GET", "path": "/accounts/{AccountId}/balances"}
    ]"#
    .to_string();

    match field {
        "version" => version = value,
        "endpoints" if value.is_empty() => endpoints = String::new(),
        "endpoints" => endpoints = format!(r#", "endpoints": {value}"#),
        "specName" => spec_name = value,
        "schemaVersion" => schema_version = value,
        "specURL" => spec_url = value,
        "specVersion" => spec_version = value,
        "name" => name = value,
        "description" => description = value,
        _ => {}
    }

    let api_specification = match (field, value) {
        ("apiSpecification", "") => String::new(),
        ("apiSpecification", value) => format!(r#""apiSpecification": {value},"#),
        _ => format!(
            r#""apiSpecification": {{"name": "{spec_name}", "url": "{spec_url}", "version": "{spec_version}", "schemaVersion": "{schema_version}"}},"#
        ),
    };

    let discovery_items = match (field, value) {
        ("discoveryItems", "") => String::new(),
        ("discoveryItems", value) => format!(r#", "discoveryItems": {value}"#),
        _ => format!(
            r#", "discoveryItems": [{{
                {api_specification}
                "openidConfigurationUri": "https://as.aspsp.ob.forgerock.financial/oauth2/.well-known/openid-configuration",
                "resourceBaseUri": "https://rs.aspsp.ob.forgerock.financial:443/"{endpoints}
            }}]"#
        ),
    };

    format!(
        r#"{{"discoveryModel": {{"name": "{name}", "description": "{description}", "discoveryVersion": "{version}"{discovery_items}}}}}"#
    )
}
