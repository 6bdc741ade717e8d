// crates/ob-conformance-core/src/core/failure.rs
// ============================================================================
// Module: Validation Failures
// Description: Semantic validation failure record.
// Purpose: Carry rule violations as data keyed by dotted document path.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Discovery validation reports rule violations as [`ValidationFailure`]
//! values rather than errors, so a single pass can return every problem.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One discovery rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Dotted path to the offending field, for example `DiscoveryModel.Name`.
    pub key: String,
    /// Human-readable message.
    pub error: String,
}

impl ValidationFailure {
    /// Creates a failure for the given key.
    #[must_use]
    pub fn new(key: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            error: error.into(),
        }
    }
}
