// crates/ob-conformance-schema/src/error.rs
// ============================================================================
// Module: Schema Errors
// Description: Structural errors raised while loading or running validators.
// Purpose: Keep I/O and parse problems distinct from semantic failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`SchemaError`] covers spec lookup, file loading, and document-level
//! rejections. Response mismatches are not errors; they are returned as
//! [`ob_conformance_core::SchemaFailure`] values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema loading and validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No candidate spec directory could be read, or a file could not be read.
    #[error("schema: {0}")]
    Io(String),
    /// A spec file is not valid JSON or YAML.
    #[error("schema: opening spec file, filename={file:?}: {message}")]
    Parse {
        /// Offending file.
        file: String,
        /// Parser message.
        message: String,
    },
    /// No spec file declares the requested title and version.
    #[error("schema: could not find spec file for spec {name} version {version}")]
    NotFound {
        /// Requested `info.title`.
        name: String,
        /// Requested `info.version`.
        version: String,
    },
    /// Document is not Swagger 2.0.
    #[error("unsupported swagger version")]
    UnsupportedSwaggerVersion,
    /// Document `info.version` is outside the supported set.
    #[error("unsupported spec version")]
    UnsupportedSpecVersion,
    /// An operation's response schema could not be compiled or resolved.
    #[error("schema: invalid operation {operation}: {message}")]
    Operation {
        /// `"METHOD /path"` of the operation.
        operation: String,
        /// Compiler or resolver message.
        message: String,
    },
}
