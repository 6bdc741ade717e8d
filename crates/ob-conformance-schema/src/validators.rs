// crates/ob-conformance-schema/src/validators.rs
// ============================================================================
// Module: Response Checks
// Description: Content-type, status-code, and body checks for one operation.
// Purpose: Produce schema failures as data for a matched Swagger operation.
// Dependencies: jsonschema, ob-conformance-core, serde_json
// ============================================================================

//! ## Overview
//! Each check inspects one aspect of a response against the matched
//! [`Operation`] and returns failures. The pipeline runs every check and
//! concatenates their failures, so a wrong status does not hide a wrong body.
//! Response schemas are compiled once as Draft 4 with the document
//! `definitions` attached, which keeps `#/definitions/..` references local.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use jsonschema::Draft;
use jsonschema::Validator;
use ob_conformance_core::HttpResponse;
use ob_conformance_core::SchemaFailure;
use serde_json::Value;
use serde_json::json;

use crate::finder::Operation;

// ============================================================================
// SECTION: Compiled Schemas
// ============================================================================

/// Body expectation for one documented response.
#[derive(Clone)]
pub(crate) enum ResponseSchema {
    /// Response declares no schema; any body is accepted.
    Absent,
    /// Response is a `type: file` download; body is not checked.
    File,
    /// Response body must satisfy the compiled schema.
    Json(Arc<Validator>),
}

impl fmt::Debug for ResponseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::File => f.write_str("File"),
            Self::Json(_) => f.write_str("Json(..)"),
        }
    }
}

/// Compiles a response schema against the document definitions.
pub(crate) fn compile_response_schema(definitions: &Value, schema: Option<&Value>) -> Result<ResponseSchema, String> {
    let Some(schema) = schema else {
        return Ok(ResponseSchema::Absent);
    };
    if schema.get("type").and_then(Value::as_str) == Some("file") {
        return Ok(ResponseSchema::File);
    }
    let wrapped = json!({
        "definitions": definitions,
        "allOf": [schema],
    });
    let validator = jsonschema::options()
        .with_draft(Draft::Draft4)
        .should_validate_formats(true)
        .build(&wrapped)
        .map_err(|err| format!("invalid schema: {err}"))?;
    Ok(ResponseSchema::Json(Arc::new(validator)))
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// One aspect of a response checked against its operation.
pub(crate) trait ResponseCheck: Send + Sync {
    /// Returns every failure found; an empty list means the check passed.
    fn check(&self, operation: &Operation, response: &HttpResponse) -> Vec<SchemaFailure>;
}

/// Response `Content-Type` must be one of the operation's `produces`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ContentTypeCheck;

impl ResponseCheck for ContentTypeCheck {
    fn check(&self, operation: &Operation, response: &HttpResponse) -> Vec<SchemaFailure> {
        if operation.produces.is_empty() {
            return Vec::new();
        }
        let Some(content_type) = response.content_type() else {
            if response.body_is_empty() {
                return Vec::new();
            }
            return vec![SchemaFailure::new(format!(
                "missing Content-Type header for {}, expected one of [{}]",
                operation.key,
                operation.produces.join(", ")
            ))];
        };
        let actual = media_type(content_type);
        if operation.produces.iter().any(|declared| media_type(declared) == actual) {
            return Vec::new();
        }
        vec![SchemaFailure::new(format!(
            "Content-Type '{content_type}' not in produces [{}] for {}",
            operation.produces.join(", "),
            operation.key
        ))]
    }
}

/// Response status must be one of the operation's documented codes.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StatusCodeCheck;

impl ResponseCheck for StatusCodeCheck {
    fn check(&self, operation: &Operation, response: &HttpResponse) -> Vec<SchemaFailure> {
        if operation.response_for_status(response.status_code).is_some() {
            return Vec::new();
        }
        vec![SchemaFailure::new(format!(
            "status code {} not documented for {}, expected one of [{}]",
            response.status_code,
            operation.key,
            operation.documented_statuses().join(", ")
        ))]
    }
}

/// Response body must satisfy the schema of the matched response.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BodyCheck;

impl ResponseCheck for BodyCheck {
    fn check(&self, operation: &Operation, response: &HttpResponse) -> Vec<SchemaFailure> {
        let Some(ResponseSchema::Json(validator)) = operation.response_for_body(response.status_code) else {
            return Vec::new();
        };
        if response.body_is_empty() {
            return vec![SchemaFailure::new(format!(
                "empty response body, schema expected for status code {}",
                response.status_code
            ))];
        }
        let body = match serde_json::from_slice::<Value>(&response.body) {
            Ok(body) => body,
            Err(err) => {
                return vec![SchemaFailure::new(format!("response body is not valid json: {err}"))];
            }
        };
        validator
            .iter_errors(&body)
            .map(|error| {
                let pointer = error.instance_path().to_string();
                let pointer = if pointer.is_empty() { "/".to_string() } else { pointer };
                SchemaFailure::new(format!("body {pointer}: {error}"))
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Lower-cased media type without parameters.
fn media_type(value: &str) -> String {
    value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
