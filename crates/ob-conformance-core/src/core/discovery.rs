// crates/ob-conformance-core/src/core/discovery.rs
// ============================================================================
// Module: Discovery Model
// Description: Serializable discovery document describing exposed endpoints.
// Purpose: Parse discovery documents without losing "missing" vs "empty" detail.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A discovery document lists, per API specification, the endpoints an
//! implementation under test exposes. Collections are modelled as `Option` so
//! that the validator can tell an absent array from an empty one and report
//! the matching rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Discovery document versions understood by this suite.
pub const SUPPORTED_VERSIONS: &[&str] = &["v0.1.0"];

/// Returns the current discovery document version.
#[must_use]
pub const fn version() -> &'static str {
    "v0.1.0"
}

/// Returns true when the discovery version is supported.
#[must_use]
pub fn is_supported_version(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while reading a discovery document.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The document is not valid JSON for the discovery shape.
    #[error("discovery parse error: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Document Types
// ============================================================================

/// Root discovery document wrapper (`{"discoveryModel": {...}}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Discovery model body.
    #[serde(rename = "discoveryModel", default)]
    pub discovery_model: DiscoveryModel,
}

impl Model {
    /// Parses a discovery document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Parse`] when the input is malformed.
    pub fn from_json(input: &str) -> Result<Self, DiscoveryError> {
        serde_json::from_str(input).map_err(|err| DiscoveryError::Parse(err.to_string()))
    }

    /// Parses a discovery document from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Parse`] when the input is malformed.
    pub fn from_slice(input: &[u8]) -> Result<Self, DiscoveryError> {
        serde_json::from_slice(input).map_err(|err| DiscoveryError::Parse(err.to_string()))
    }

    /// Iterates every endpoint in document order.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.discovery_model.items().iter().flat_map(DiscoveryItem::endpoints)
    }
}

/// Discovery model body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryModel {
    /// Template name.
    #[serde(default)]
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Discovery document format version.
    #[serde(default)]
    pub discovery_version: String,
    /// Optional token acquisition mode (for example `psu` or `headless`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_acquisition: Option<String>,
    /// API groupings in declared order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_items: Option<Vec<DiscoveryItem>>,
    /// Custom tests whose replacements seed the run context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_tests: Option<Vec<CustomTest>>,
}

impl DiscoveryModel {
    /// Returns the discovery items, or an empty slice when absent.
    #[must_use]
    pub fn items(&self) -> &[DiscoveryItem] {
        self.discovery_items.as_deref().unwrap_or_default()
    }

    /// Returns the custom tests, or an empty slice when absent.
    #[must_use]
    pub fn custom_tests(&self) -> &[CustomTest] {
        self.custom_tests.as_deref().unwrap_or_default()
    }
}

/// One API grouping inside a discovery document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryItem {
    /// Specification the endpoints belong to.
    #[serde(default)]
    pub api_specification: ApiSpecification,
    /// OpenID provider configuration URI.
    #[serde(default)]
    pub openid_configuration_uri: String,
    /// Base URI for resource requests.
    #[serde(default)]
    pub resource_base_uri: String,
    /// Endpoints exposed for this specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<Endpoint>>,
}

impl DiscoveryItem {
    /// Returns the endpoints, or an empty slice when absent.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        self.endpoints.as_deref().unwrap_or_default()
    }
}

/// Specification identity declared by a discovery item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpecification {
    /// Specification name.
    #[serde(default)]
    pub name: String,
    /// Specification documentation URL.
    #[serde(default)]
    pub url: String,
    /// Specification version label.
    #[serde(default)]
    pub version: String,
    /// OpenAPI document URL identifying the schema version.
    #[serde(default)]
    pub schema_version: String,
}

/// Endpoint exposed by the implementation under test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// HTTP method.
    #[serde(default)]
    pub method: String,
    /// Path template, for example `/accounts/{AccountId}`.
    #[serde(default)]
    pub path: String,
    /// Response fields that are conditionally present for this endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_properties: Option<Vec<ConditionalProperty>>,
}

impl Endpoint {
    /// Creates an endpoint without conditional properties.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            conditional_properties: None,
        }
    }

    /// Returns the `"METHOD PATH"` lookup key.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Conditionally present response property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalProperty {
    /// Schema definition name.
    #[serde(default)]
    pub schema: String,
    /// Property name within the schema.
    #[serde(default)]
    pub property: String,
    /// Dotted JSON path to the property in responses.
    #[serde(default)]
    pub path: String,
}

/// Custom test block carrying context replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTest {
    /// Custom test name.
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Replacement values copied into the run context.
    #[serde(default)]
    pub replacements: BTreeMap<String, String>,
}
