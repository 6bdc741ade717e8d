// crates/ob-conformance-schema/src/finder.rs
// ============================================================================
// Module: Operation Finder
// Description: Maps a response's method and path onto a Swagger operation.
// Purpose: Resolve templated paths and basePath prefixes to compiled operations.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The finder indexes every operation of a document once at construction.
//! Lookups try the request path verbatim and then with the document
//! `basePath` removed. A `{Param}` template segment matches exactly one
//! non-empty path segment; when several templates match, the one with the
//! most literal segments wins, then document order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::document::SwaggerDocument;
use crate::document::string_list;
use crate::error::SchemaError;
use crate::validators::ResponseSchema;
use crate::validators::compile_response_schema;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Segment that must match verbatim.
    Literal(String),
    /// `{Param}` segment matching any non-empty segment.
    Parameter,
}

/// Indexed operation with compiled response schemas.
#[derive(Debug)]
pub(crate) struct Operation {
    /// `"METHOD /template"` label used in failure messages.
    pub(crate) key: String,
    /// Upper-case HTTP method.
    method: String,
    /// Parsed path template.
    segments: Vec<Segment>,
    /// Effective `produces` list (operation level, else document level).
    pub(crate) produces: Vec<String>,
    /// Responses keyed by status code string or `default`.
    pub(crate) responses: BTreeMap<String, ResponseSchema>,
}

impl Operation {
    /// Returns the documented response for an exact status code.
    pub(crate) fn response_for_status(&self, status: u16) -> Option<&ResponseSchema> {
        self.responses.get(&status.to_string())
    }

    /// Returns the response used for body checks: exact status, else `default`.
    pub(crate) fn response_for_body(&self, status: u16) -> Option<&ResponseSchema> {
        self.response_for_status(status).or_else(|| self.responses.get("default"))
    }

    /// Returns the documented status codes, excluding `default`.
    pub(crate) fn documented_statuses(&self) -> Vec<&str> {
        self.responses.keys().map(String::as_str).filter(|code| *code != "default").collect()
    }

    /// Counts literal segments when the path matches, else `None`.
    fn literal_score(&self, segments: &[&str]) -> Option<usize> {
        if segments.len() != self.segments.len() {
            return None;
        }
        let mut score = 0;
        for (template, actual) in self.segments.iter().zip(segments) {
            match template {
                Segment::Literal(literal) if literal.as_str() == *actual => score += 1,
                Segment::Parameter if !actual.is_empty() => {}
                _ => return None,
            }
        }
        Some(score)
    }
}

/// Operation index for one document.
#[derive(Debug)]
pub(crate) struct Finder {
    /// Document `basePath` without trailing slash.
    base_path: String,
    /// Operations in document order.
    operations: Vec<Operation>,
}

impl Finder {
    /// Indexes and compiles every operation in the document.
    pub(crate) fn new(document: &SwaggerDocument) -> Result<Self, SchemaError> {
        let definitions = document.definitions();
        let document_produces = document.produces();
        let mut operations = Vec::new();
        for (method, template, operation) in document.operations() {
            let key = format!("{method} {template}");
            let produces = match operation.get("produces") {
                Some(list) => string_list(Some(list)),
                None => document_produces.clone(),
            };
            let mut responses = BTreeMap::new();
            if let Some(declared) = operation.get("responses").and_then(Value::as_object) {
                for (code, response) in declared {
                    let response = document.resolve_response(response).ok_or_else(|| SchemaError::Operation {
                        operation: key.clone(),
                        message: format!("unresolved response reference for {code}"),
                    })?;
                    let schema = compile_response_schema(&definitions, response.get("schema"))
                        .map_err(|message| SchemaError::Operation {
                            operation: key.clone(),
                            message,
                        })?;
                    responses.insert(code.clone(), schema);
                }
            }
            operations.push(Operation {
                key,
                method,
                segments: parse_template(template),
                produces,
                responses,
            });
        }
        Ok(Self {
            base_path: document.base_path().to_string(),
            operations,
        })
    }

    /// Finds the operation for a method and request path.
    pub(crate) fn find(&self, method: &str, path: &str) -> Option<&Operation> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if let Some(operation) = self.find_exact(method, path) {
            return Some(operation);
        }
        if self.base_path.is_empty() {
            return None;
        }
        let stripped = path.strip_prefix(self.base_path.as_str())?;
        if stripped.is_empty() {
            return self.find_exact(method, "/");
        }
        if !stripped.starts_with('/') {
            return None;
        }
        self.find_exact(method, stripped)
    }

    /// Finds the best template match without basePath handling.
    fn find_exact(&self, method: &str, path: &str) -> Option<&Operation> {
        let segments = split_path(path);
        let mut best: Option<(usize, &Operation)> = None;
        for operation in &self.operations {
            if !operation.method.eq_ignore_ascii_case(method) {
                continue;
            }
            if let Some(score) = operation.literal_score(&segments)
                && best.is_none_or(|(current, _)| score > current)
            {
                best = Some((score, operation));
            }
        }
        best.map(|(_, operation)| operation)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits a path into segments, ignoring leading and trailing slashes.
fn split_path(path: &str) -> Vec<&str> {
    path.trim_matches('/').split('/').collect()
}

/// Parses a path template into segments.
fn parse_template(template: &str) -> Vec<Segment> {
    split_path(template)
        .into_iter()
        .map(|segment| {
            if segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}') {
                Segment::Parameter
            } else {
                Segment::Literal(segment.to_string())
            }
        })
        .collect()
}
