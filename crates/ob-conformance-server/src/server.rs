// crates/ob-conformance-server/src/server.rs
// ============================================================================
// Module: Conformance HTTP Server
// Description: axum routes for redirect callbacks and discovery validation.
// Purpose: Expose the redirect validator and discovery checks over HTTP.
// Dependencies: axum, ob-conformance-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! The server accepts authorization redirects forwarded by the browser
//! front-end and discovery documents submitted for validation. Every
//! response is JSON with `Content-Type: application/json; charset=UTF-8`.
//!
//! | Route | Success | Failure |
//! |-------|---------|---------|
//! | `POST /api/redirect/fragment/ok` | 200 `null` | 400 `{"error": ..}` |
//! | `POST /api/redirect/query/ok` | 200 `null` | 400 `{"error": ..}` |
//! | `POST /api/redirect/error` | 200 verbatim echo | 400 `{"error": ..}` |
//! | `POST /api/discovery-model/validate` | 200 `{}` | 400 `{"error": ..}` |
//! | `POST /api/discovery-model/fields` | 200 field list | 400 `{"error": ..}` |
//!
//! Redirect handlers can run while a conformance run is in progress; they
//! share the run [`Context`] through [`RedirectValidator`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use ob_conformance_core::ConditionalityChecker;
use ob_conformance_core::Context;
use ob_conformance_core::Model;
use ob_conformance_core::TokenCollector;
use ob_conformance_core::field_rules;
use ob_conformance_core::validate_discovery;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::audit::RedirectAuditEvent;
use crate::audit::RedirectAuditOutcome;
use crate::audit::RedirectAuditSink;
use crate::audit::RedirectChannel;
use crate::config::ConformanceConfig;
use crate::redirect::RedirectCode;
use crate::redirect::RedirectError;
use crate::redirect::RedirectErrorPayload;
use crate::redirect::RedirectOutcome;
use crate::redirect::RedirectValidator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type carried by every response.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup and transport errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Conditionality checker shared across handler tasks.
pub type SharedChecker = Arc<dyn ConditionalityChecker + Send + Sync>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Redirect validator bound to the run context.
    redirect: RedirectValidator,
    /// Conditionality lookups for discovery validation.
    checker: SharedChecker,
    /// Redirect audit destination.
    audit: Arc<dyn RedirectAuditSink>,
}

impl AppState {
    /// Creates handler state over a run context.
    #[must_use]
    pub fn new(context: Context, checker: SharedChecker, audit: Arc<dyn RedirectAuditSink>) -> Self {
        Self {
            redirect: RedirectValidator::new(context),
            checker,
            audit,
        }
    }

    /// Completes consent token sets in `tokens` as redirects are accepted.
    #[must_use]
    pub fn with_token_collector(mut self, tokens: TokenCollector) -> Self {
        self.redirect = self.redirect.with_token_collector(tokens);
        self
    }

    /// Returns the run context redirects write to.
    #[must_use]
    pub const fn context(&self) -> &Context {
        self.redirect.context()
    }

    /// Returns the consent token collector redirects complete.
    #[must_use]
    pub const fn tokens(&self) -> &TokenCollector {
        self.redirect.tokens()
    }
}

// ============================================================================
// SECTION: Serving
// ============================================================================

/// Builds the router with a request body cap of `max_body_bytes`.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/redirect/fragment/ok", post(handle_fragment_ok))
        .route("/api/redirect/query/ok", post(handle_query_ok))
        .route("/api/redirect/error", post(handle_redirect_error))
        .route("/api/discovery-model/validate", post(handle_discovery_validate))
        .route("/api/discovery-model/fields", post(handle_discovery_fields))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(Arc::new(state))
}

/// Binds the configured address and serves until the listener fails.
///
/// # Errors
///
/// Returns [`ServerError`] when the address is invalid or binding fails.
pub async fn serve(config: &ConformanceConfig, state: AppState) -> Result<(), ServerError> {
    let addr: SocketAddr = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
    let app = router(state, config.server.max_body_bytes);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
    axum::serve(listener, app).await.map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
}

// ============================================================================
// SECTION: Redirect Handlers
// ============================================================================

/// Handles code redirects delivered in the URL fragment.
async fn handle_fragment_ok(State(state): State<Arc<AppState>>, bytes: Bytes) -> Response {
    redirect_ok(&state, RedirectChannel::Fragment, &bytes)
}

/// Handles code redirects delivered in the query string.
async fn handle_query_ok(State(state): State<Arc<AppState>>, bytes: Bytes) -> Response {
    redirect_ok(&state, RedirectChannel::Query, &bytes)
}

/// Acknowledges error-shaped redirects by echoing the received document.
async fn handle_redirect_error(State(state): State<Arc<AppState>>, bytes: Bytes) -> Response {
    let parsed = serde_json::from_slice::<Value>(&bytes)
        .and_then(|document| RedirectErrorPayload::deserialize(&document).map(|payload| (document, payload)));
    let (document, payload) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            state.audit.record(
                &RedirectAuditEvent::new(RedirectChannel::Error, RedirectAuditOutcome::Rejected)
                    .with_error_kind("malformed_payload"),
            );
            return error_response(StatusCode::BAD_REQUEST, err.to_string());
        }
    };
    state.audit.record(
        &RedirectAuditEvent::new(RedirectChannel::Error, RedirectAuditOutcome::Acknowledged)
            .with_state(payload.state.as_deref().unwrap_or_default())
            .with_oauth_error(payload.error.as_deref().unwrap_or_default()),
    );
    json_response(StatusCode::OK, &document)
}

/// Validates a code-bearing redirect and records the outcome.
fn redirect_ok(state: &AppState, channel: RedirectChannel, bytes: &[u8]) -> Response {
    let payload: RedirectCode = match serde_json::from_slice(bytes) {
        Ok(payload) => payload,
        Err(err) => {
            state.audit.record(
                &RedirectAuditEvent::new(channel, RedirectAuditOutcome::Rejected).with_error_kind("malformed_payload"),
            );
            return error_response(StatusCode::BAD_REQUEST, err.to_string());
        }
    };
    let event = |outcome| RedirectAuditEvent::new(channel, outcome).with_state(&payload.state);
    match state.redirect.validate_code(&payload) {
        Ok(RedirectOutcome::Accepted) => {
            state.audit.record(&event(RedirectAuditOutcome::Accepted));
            json_response(StatusCode::OK, &Value::Null)
        }
        Ok(RedirectOutcome::CHashInvalid) => {
            state.audit.record(&event(RedirectAuditOutcome::CHashInvalid));
            error_response(StatusCode::BAD_REQUEST, "c_hash invalid")
        }
        Err(err) => {
            let (status, kind) = match &err {
                RedirectError::Decode(_) => (StatusCode::BAD_REQUEST, "id_token_decode"),
                RedirectError::UnsupportedAlgorithm(_) => (StatusCode::BAD_REQUEST, "unsupported_algorithm"),
                RedirectError::MissingState => (StatusCode::BAD_REQUEST, "missing_state"),
                RedirectError::Context(_) => (StatusCode::INTERNAL_SERVER_ERROR, "context_store"),
                RedirectError::Tokens(_) => (StatusCode::INTERNAL_SERVER_ERROR, "token_store"),
            };
            state.audit.record(&event(RedirectAuditOutcome::Rejected).with_error_kind(kind));
            error_response(status, err.to_string())
        }
    }
}

// ============================================================================
// SECTION: Discovery Handlers
// ============================================================================

/// Validates a submitted discovery document.
async fn handle_discovery_validate(State(state): State<Arc<AppState>>, bytes: Bytes) -> Response {
    match parse_and_validate(&state, &bytes) {
        Ok(_) => json_response(StatusCode::OK, &json!({})),
        Err(response) => response,
    }
}

/// Returns the configuration fields a valid discovery document requires.
async fn handle_discovery_fields(State(state): State<Arc<AppState>>, bytes: Bytes) -> Response {
    match parse_and_validate(&state, &bytes) {
        Ok(model) => json_response(StatusCode::OK, &field_rules(&model)),
        Err(response) => response,
    }
}

/// Parses and validates a discovery document, rendering failures as 400s.
fn parse_and_validate(state: &AppState, bytes: &[u8]) -> Result<Model, Response> {
    let model = Model::from_slice(bytes).map_err(|err| error_response(StatusCode::BAD_REQUEST, err.to_string()))?;
    let (passed, failures) = validate_discovery(state.checker.as_ref(), &model);
    if !passed {
        return Err(json_response(StatusCode::BAD_REQUEST, &json!({ "error": failures })));
    }
    Ok(model)
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Renders `{"error": message}`.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    json_response(status, &json!({ "error": message.into() }))
}

/// Serializes `body` with the JSON content type.
fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_string(body) {
        Ok(payload) => (status, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], payload).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, JSON_CONTENT_TYPE)],
            r#"{"error":"serialization failed"}"#.to_string(),
        )
            .into_response(),
    }
}
