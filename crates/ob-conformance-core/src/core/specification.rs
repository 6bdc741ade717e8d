// crates/ob-conformance-core/src/core/specification.rs
// ============================================================================
// Module: Specification Registry
// Description: Immutable registry of API specifications supported by the suite.
// Purpose: Join discovery items to schema documents by schema version URL.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The registry is a fixed, process-wide table. Lookups never mutate it, so
//! it is a plain `static` slice and needs no synchronization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Registered API specification.
///
/// # Invariants
/// - `schema_version` is unique across the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Specification {
    /// Stable identifier, for example `account-transaction-v3.1`.
    pub identifier: &'static str,
    /// Published specification name.
    pub name: &'static str,
    /// Specification documentation URL.
    pub url: &'static str,
    /// Specification version label.
    pub version: &'static str,
    /// OpenAPI document URL.
    pub schema_version: &'static str,
}

/// Registry lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No entry is registered for the schema version.
    #[error("no specifications found for schema version: {0}")]
    NotFound(String),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registered specifications in declaration order.
static SPECIFICATIONS: &[Specification] = &[
    Specification {
        identifier: "account-transaction-v3.0",
        name: "Account and Transaction API Specification",
        url: "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/642090641/Account+and+Transaction+API+Specification+-+v3.0",
        version: "v3.0",
        schema_version: "https://raw.githubusercontent.com/OpenBankingUK/read-write-api-specs/v3.0.0/dist/account-info-swagger.json",
    },
    Specification {
        identifier: "account-transaction-v3.1",
        name: "Account and Transaction API Specification",
        url: "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/937820271/Account+and+Transaction+API+Specification+-+v3.1",
        version: "v3.1",
        schema_version: "https://raw.githubusercontent.com/OpenBankingUK/read-write-api-specs/v3.1.0/dist/account-info-swagger.json",
    },
    Specification {
        identifier: "payment-initiation-v3.1",
        name: "Payment Initiation API",
        url: "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/937754701/Payment+Initiation+API+Specification+-+v3.1",
        version: "v3.1",
        schema_version: "https://raw.githubusercontent.com/OpenBankingUK/read-write-api-specs/v3.1.0/dist/payment-initiation-swagger.json",
    },
    Specification {
        identifier: "confirmation-funds-v3.1",
        name: "Confirmation of Funds API Specification",
        url: "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/937951380/Confirmation+of+Funds+API+Specification+-+v3.1",
        version: "v3.1",
        schema_version: "https://raw.githubusercontent.com/OpenBankingUK/read-write-api-specs/v3.1.0/dist/confirmation-funds-swagger.json",
    },
    Specification {
        identifier: "event-notification-aspsp-v3.1",
        name: "Event Notification API Specification - ASPSP Endpoints",
        url: "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/937951397/Event+Notification+API+Specification+-+v3.1",
        version: "v3.1",
        schema_version: "https://raw.githubusercontent.com/OpenBankingUK/read-write-api-specs/v3.1.0/dist/callback-urls-swagger.yaml",
    },
    Specification {
        identifier: "event-notification-tpp-v3.1",
        name: "Event Notification API Specification - TPP Endpoints",
        url: "https://openbanking.atlassian.net/wiki/spaces/DZ/pages/937951397/Event+Notification+API+Specification+-+v3.1",
        version: "v3.1",
        schema_version: "https://raw.githubusercontent.com/OpenBankingUK/read-write-api-specs/v3.1.0/dist/event-notifications-swagger.json",
    },
];

/// Returns every registered specification.
#[must_use]
pub fn specifications() -> &'static [Specification] {
    SPECIFICATIONS
}

/// Returns the specification registered for a schema version URL.
///
/// # Errors
///
/// Returns [`RegistryError::NotFound`] when nothing is registered for it.
pub fn specification_from_schema_version(
    schema_version: &str,
) -> Result<Specification, RegistryError> {
    SPECIFICATIONS
        .iter()
        .find(|spec| spec.schema_version == schema_version)
        .copied()
        .ok_or_else(|| RegistryError::NotFound(schema_version.to_string()))
}
