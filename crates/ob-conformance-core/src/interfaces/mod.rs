// crates/ob-conformance-core/src/interfaces/mod.rs
// ============================================================================
// Module: OB Conformance Interfaces
// Description: Collaborator contracts for conditionality, schemas, and transport.
// Purpose: Keep the runtime independent of lookup tables, schema files, and HTTP.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The runtime reaches every external system through the traits in this
//! module, so each can be replaced by a test double. Implementations return
//! explicit errors for structural problems and plain data for semantic
//! failures; they never panic the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Context;
use crate::core::discovery::ApiSpecification;
use crate::core::discovery::Endpoint;
use crate::core::response::HttpResponse;
use crate::core::testcase::Certificate;
use crate::core::testcase::PreparedRequest;

// ============================================================================
// SECTION: Conditionality
// ============================================================================

/// Conditionality lookup failure. The message is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConditionalityError(pub String);

/// Reports whether endpoints are mandatory, optional, or conditional for a
/// specification.
pub trait ConditionalityChecker {
    /// Returns true when the endpoint is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionalityError`] when the specification is unknown.
    fn is_optional(&self, method: &str, endpoint: &str, specification: &str) -> Result<bool, ConditionalityError>;

    /// Returns true when the endpoint is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionalityError`] when the specification is unknown.
    fn is_mandatory(&self, method: &str, endpoint: &str, specification: &str) -> Result<bool, ConditionalityError>;

    /// Returns true when the endpoint is conditional.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionalityError`] when the specification is unknown.
    fn is_conditional(&self, method: &str, endpoint: &str, specification: &str) -> Result<bool, ConditionalityError>;

    /// Returns true when the endpoint belongs to the specification at all.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionalityError`] when the specification is unknown.
    fn is_present(&self, method: &str, endpoint: &str, specification: &str) -> Result<bool, ConditionalityError>;

    /// Returns the mandatory endpoints absent from `endpoints`.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionalityError`] when the specification is unknown.
    fn missing_mandatory(
        &self,
        endpoints: &[Endpoint],
        specification: &str,
    ) -> Result<Vec<Endpoint>, ConditionalityError>;
}

// ============================================================================
// SECTION: Response Validation
// ============================================================================

/// One semantic schema mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFailure {
    /// Human-readable message naming the status, content type, or pointer.
    pub message: String,
}

impl SchemaFailure {
    /// Creates a failure with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Schema validator execution error, distinct from [`SchemaFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema validation error: {0}")]
pub struct SchemaValidationError(pub String);

/// Validates responses against a published schema.
pub trait ResponseValidator: Send + Sync {
    /// Returns every mismatch between the response and the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError`] when validation cannot run.
    fn validate(&self, response: &HttpResponse) -> Result<Vec<SchemaFailure>, SchemaValidationError>;
}

/// Validator construction error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validator unavailable: {0}")]
pub struct ResolveError(pub String);

/// Supplies a response validator for a specification.
pub trait ValidatorResolver {
    /// Returns the validator for the specification.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when no validator can be constructed.
    fn resolve(&self, specification: &ApiSpecification) -> Result<Arc<dyn ResponseValidator>, ResolveError>;
}

impl<F> ValidatorResolver for F
where
    F: Fn(&ApiSpecification) -> Result<Arc<dyn ResponseValidator>, ResolveError>,
{
    fn resolve(&self, specification: &ApiSpecification) -> Result<Arc<dyn ResponseValidator>, ResolveError> {
        self(specification)
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Transport errors. A failure here fails only the current test case.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Certificates were rejected by the transport.
    #[error("certificate error: {0}")]
    Certificate(String),
    /// Request could not be built.
    #[error("invalid request: {0}")]
    Request(String),
    /// Request failed in transit.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response exceeded the configured size limit.
    #[error("response exceeds size limit")]
    TooLarge,
}

/// Sends prepared requests to the implementation under test.
pub trait TestCaseExecutor {
    /// Installs the signing and transport key pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::Certificate`] when the pair is unusable.
    fn set_certificates(&mut self, signing: &Certificate, transport: &Certificate) -> Result<(), ExecuteError>;

    /// Sends a request and captures the response.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError`] when the request fails in transit.
    fn execute(&self, request: &PreparedRequest, context: &Context) -> Result<HttpResponse, ExecuteError>;
}
