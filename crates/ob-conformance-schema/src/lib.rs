// crates/ob-conformance-schema/src/lib.rs
// ============================================================================
// Module: OB Conformance Schema Library
// Description: Swagger 2.0 response validation for conformance runs.
// Purpose: Expose the Swagger validator and the per-spec validator cache.
// Dependencies: jsonschema, ob-conformance-core, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! Validates recorded HTTP responses against the published Swagger document
//! for an API specification. A validator checks content type, status code,
//! and body for the operation matched by the response method and path, and
//! reports every mismatch as a [`ob_conformance_core::SchemaFailure`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod error;
mod finder;
pub mod registry;
mod validators;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::MAX_SPEC_BYTES;
pub use document::SwaggerDocument;
pub use error::SchemaError;
pub use registry::DEFAULT_SPEC_DIRS;
pub use registry::SUPPORTED_SPEC_VERSIONS;
pub use registry::SUPPORTED_SWAGGER_VERSION;
pub use registry::SchemaRegistry;
pub use registry::SwaggerValidator;
