// crates/ob-conformance-core/src/core/testcase.rs
// ============================================================================
// Module: Test Case Model
// Description: Generated request/expectation pairs and their run inputs.
// Purpose: Bind context variables into requests and judge responses.
// Dependencies: jsonpath_lib, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`TestCase`] is an input produced by an external generator. Preparing a
//! case substitutes `$name` variables from the run [`Context`]; validating a
//! case checks the status code, optional schema conformance, declared
//! matches, and finally captures values into the context for later cases.
//!
//! Preparation errors are fatal to a run. Validation errors only fail the
//! case that raised them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use jsonpath_lib::select;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::context::Context;
use crate::core::context::ContextError;
use crate::core::discovery::ApiSpecification;
use crate::core::discovery::Model;
use crate::core::response::HttpResponse;
use crate::interfaces::ResponseValidator;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while preparing a request.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// A `$name` variable has no value in the context.
    #[error("unresolved variable ${0}")]
    UnresolvedVariable(String),
    /// The context could not be read.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The request has no endpoint.
    #[error("test case {0} has no endpoint")]
    MissingEndpoint(String),
}

/// Errors raised while validating a response.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// Schema validation was requested but no validator exists.
    #[error("schema validator unavailable")]
    SchemaUnavailable,
    /// The schema validator failed to run.
    #[error("schema validation error: {0}")]
    Schema(String),
    /// The response body is not JSON but a JSON expectation needs it.
    #[error("response body is not json: {0}")]
    Body(String),
    /// A JSONPath expression is malformed.
    #[error("invalid jsonpath: {0}")]
    JsonPath(String),
    /// The context could not be written.
    #[error(transparent)]
    Context(#[from] ContextError),
}

// ============================================================================
// SECTION: Test Case Types
// ============================================================================

/// Generated test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Stable identifier, for example `OB-301-ACC-100100`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Request template.
    pub input: Input,
    /// Response expectations.
    pub expect: Expect,
    /// Values captured into the context when the case passes.
    #[serde(default)]
    pub context_put: Vec<ContextPut>,
}

/// Request template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// HTTP method.
    pub method: String,
    /// Endpoint path relative to the resource base URI, or an absolute URL.
    pub endpoint: String,
    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Optional request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Response expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expect {
    /// Expected status code.
    pub status_code: u16,
    /// Run the specification's schema validator.
    #[serde(default)]
    pub schema_validation: bool,
    /// Additional body/header checks.
    #[serde(default)]
    pub matches: Vec<Match>,
}

/// One body or header expectation.
///
/// Exactly one of `json` or `header` should be set. When `value` is absent
/// the check only requires presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSONPath into the response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
    /// Response header name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Exact expected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Context capture declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPut {
    /// Context key to write.
    pub name: String,
    /// JSONPath into the response body.
    pub json: String,
}

/// Test cases generated for one specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationTestCases {
    /// Specification under test.
    pub specification: ApiSpecification,
    /// Base URI requests are resolved against.
    #[serde(default)]
    pub base_uri: String,
    /// Test cases in execution order.
    pub test_cases: Vec<TestCase>,
}

/// PEM-encoded key pair. Loading it from disk is the caller's concern.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Public certificate PEM.
    pub public_pem: String,
    /// Private key PEM.
    pub private_pem: String,
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("public_pem", &self.public_pem)
            .field("private_pem", &"<redacted>")
            .finish()
    }
}

impl Certificate {
    /// Returns the context representation of the pair.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "public": self.public_pem, "private": self.private_pem })
    }
}

/// Everything the execution controller needs for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDefinition {
    /// Validated discovery model.
    pub discovery: Model,
    /// Generated test cases per specification.
    pub spec_tests: Vec<SpecificationTestCases>,
    /// Request signing key pair.
    pub signing_cert: Certificate,
    /// Mutual TLS key pair.
    pub transport_cert: Certificate,
}

// ============================================================================
// SECTION: Prepared Requests
// ============================================================================

/// Fully bound request ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Upper-case HTTP method.
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Path component of `url`.
    pub path: String,
    /// Request headers with variables substituted.
    pub headers: BTreeMap<String, String>,
    /// Request body with variables substituted.
    pub body: Option<String>,
}

/// Outcome of validating one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// True when every check held.
    pub pass: bool,
    /// One entry per failed check.
    pub reasons: Vec<String>,
}

impl TestCase {
    /// Returns the `"METHOD endpoint"` label used in reports and events.
    #[must_use]
    pub fn endpoint_label(&self) -> String {
        format!("{} {}", self.input.method.to_ascii_uppercase(), self.input.endpoint)
    }

    /// Binds context variables into the request template.
    ///
    /// # Errors
    ///
    /// Returns [`PrepareError`] when the endpoint is empty or a variable is
    /// not present in the context.
    pub fn prepare(&self, context: &Context, base_uri: &str) -> Result<PreparedRequest, PrepareError> {
        if self.input.endpoint.trim().is_empty() {
            return Err(PrepareError::MissingEndpoint(self.id.clone()));
        }
        let endpoint = substitute(&self.input.endpoint, context)?;
        let url = join_url(base_uri, &endpoint);
        let mut headers = BTreeMap::new();
        for (name, value) in &self.input.headers {
            headers.insert(name.clone(), substitute(value, context)?);
        }
        let body = self.input.body.as_deref().map(|body| substitute(body, context)).transpose()?;
        Ok(PreparedRequest {
            method: self.input.method.to_ascii_uppercase(),
            path: url_path(&url).to_string(),
            url,
            headers,
            body,
        })
    }

    /// Judges a response and captures context values when it passes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError`] when a check cannot be evaluated at all.
    pub fn validate(
        &self,
        response: &HttpResponse,
        context: &Context,
        validator: Option<&dyn ResponseValidator>,
    ) -> Result<Verdict, ValidateError> {
        let mut reasons = Vec::new();
        if response.status_code != self.expect.status_code {
            reasons.push(format!(
                "status code {} does not match expected {}",
                response.status_code, self.expect.status_code
            ));
        }

        if self.expect.schema_validation {
            let validator = validator.ok_or(ValidateError::SchemaUnavailable)?;
            let failures =
                validator.validate(response).map_err(|err| ValidateError::Schema(err.to_string()))?;
            reasons.extend(failures.into_iter().map(|failure| failure.message));
        }

        let mut body = LazyBody::new(&response.body);
        for check in &self.expect.matches {
            if let Some(reason) = evaluate_match(check, response, &mut body)? {
                reasons.push(reason);
            }
        }

        if reasons.is_empty() {
            let mut captured = Vec::with_capacity(self.context_put.len());
            for put in &self.context_put {
                let matches = select(body.json()?, &put.json)
                    .map_err(|_| ValidateError::JsonPath(put.json.clone()))?;
                match matches.first() {
                    Some(value) => captured.push((put.name.clone(), (*value).clone())),
                    None => reasons.push(format!("context_put {}: no value at {}", put.name, put.json)),
                }
            }
            if reasons.is_empty() {
                context.extend(captured)?;
            }
        }

        Ok(Verdict {
            pass: reasons.is_empty(),
            reasons,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Response body parsed on first use.
struct LazyBody<'a> {
    /// Raw body bytes.
    raw: &'a [u8],
    /// Parsed document.
    parsed: Option<Value>,
}

impl<'a> LazyBody<'a> {
    /// Wraps a raw body.
    const fn new(raw: &'a [u8]) -> Self {
        Self {
            raw,
            parsed: None,
        }
    }

    /// Returns the parsed JSON body.
    fn json(&mut self) -> Result<&Value, ValidateError> {
        if self.parsed.is_none() {
            let value = serde_json::from_slice::<Value>(self.raw)
                .map_err(|err| ValidateError::Body(err.to_string()))?;
            self.parsed = Some(value);
        }
        self.parsed.as_ref().ok_or_else(|| ValidateError::Body("empty".to_string()))
    }
}

/// Evaluates one match, returning a failure reason when it does not hold.
fn evaluate_match(
    check: &Match,
    response: &HttpResponse,
    body: &mut LazyBody<'_>,
) -> Result<Option<String>, ValidateError> {
    if let Some(path) = &check.json {
        let selected =
            select(body.json()?, path).map_err(|_| ValidateError::JsonPath(path.clone()))?;
        let holds = match &check.value {
            Some(expected) => selected.iter().any(|value| value_text(value) == *expected),
            None => !selected.is_empty(),
        };
        return Ok((!holds).then(|| describe(check, &format!("json match failed at {path}"))));
    }
    if let Some(name) = &check.header {
        let holds = match (response.header(name), &check.value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        };
        return Ok((!holds).then(|| describe(check, &format!("header match failed for {name}"))));
    }
    Ok(None)
}

/// Prefixes a reason with the match description when present.
fn describe(check: &Match, reason: &str) -> String {
    match &check.description {
        Some(description) => format!("{description}: {reason}"),
        None => reason.to_string(),
    }
}

/// Renders a JSON value for comparison with a declared string.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Replaces `$name` tokens with context values.
fn substitute(template: &str, context: &Context) -> Result<String, PrepareError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(index) = rest.find('$') {
        output.push_str(&rest[.. index]);
        let after = &rest[index + 1 ..];
        let name_len = after
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .unwrap_or(after.len());
        if name_len == 0 {
            output.push('$');
            rest = after;
            continue;
        }
        let name = &after[.. name_len];
        let value = match context.get(name) {
            Ok(value) => value,
            Err(ContextError::NotFound(_)) => {
                return Err(PrepareError::UnresolvedVariable(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        output.push_str(&value_text(&value));
        rest = &after[name_len ..];
    }
    output.push_str(rest);
    Ok(output)
}

/// Resolves an endpoint against a base URI; absolute endpoints win.
fn join_url(base_uri: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") || base_uri.is_empty() {
        return endpoint.to_string();
    }
    let base = base_uri.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

/// Returns the path component of a URL, without query or fragment.
#[must_use]
pub fn url_path(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(url, |index| &url[index + 3 ..]);
    let path = after_scheme.find('/').map_or("/", |index| &after_scheme[index ..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[.. end]
}

// ============================================================================
// SECTION: Tests
// ============================================================================
