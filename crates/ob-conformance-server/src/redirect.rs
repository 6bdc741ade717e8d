// crates/ob-conformance-server/src/redirect.rs
// ============================================================================
// Module: OIDC Redirect Validation
// Description: c_hash binding check for hybrid-flow authorization redirects.
// Purpose: Accept codes whose id_token c_hash matches and store them for runs.
// Dependencies: base64, ob-conformance-core, serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! A hybrid-flow redirect carries an authorization `code` together with an
//! `id_token` whose `c_hash` claim binds the two. The claim is the base64url
//! encoding of the left half of the digest of `code`, where the digest is
//! chosen by the token's `alg` header. Accepted codes are stored in the
//! shared [`Context`] under the `state` value so later test cases can refer
//! to them as `$<state>`. When the state names a registered consent token
//! set, the code also completes that set in the shared [`TokenCollector`].
//!
//! Only the binding is checked. The token signature is not verified.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ob_conformance_core::Context;
use ob_conformance_core::ContextError;
use ob_conformance_core::TokenCollector;
use ob_conformance_core::TokenError;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use sha2::Sha384;
use sha2::Sha512;
use thiserror::Error;

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Code-bearing redirect payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectCode {
    /// Authorization code.
    #[serde(default)]
    pub code: String,
    /// Granted scopes.
    #[serde(default)]
    pub scope: String,
    /// Identity token binding the code.
    #[serde(default)]
    pub id_token: String,
    /// Client state echoed by the authorization server.
    #[serde(default)]
    pub state: String,
}

/// Error-shaped redirect payload. Absent fields stay absent when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectErrorPayload {
    /// OAuth error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    /// Client state echoed by the authorization server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Result of checking a code-bearing redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The c_hash claim matches the code; the pair was stored.
    Accepted,
    /// The c_hash claim is missing or does not match.
    CHashInvalid,
}

/// Structural redirect errors.
#[derive(Debug, Error)]
pub enum RedirectError {
    /// The id_token could not be decoded.
    #[error("id_token decode error: {0}")]
    Decode(String),
    /// The token `alg` has no associated hash.
    #[error("{0} algorithm not supported")]
    UnsupportedAlgorithm(String),
    /// The redirect carries no `state`, so the code could not be referenced.
    #[error("state missing from redirect")]
    MissingState,
    /// The accepted pair could not be stored.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The accepted code could not be recorded as a consent token.
    #[error(transparent)]
    Tokens(#[from] TokenError),
}

// ============================================================================
// SECTION: Token Decoding
// ============================================================================

/// Fields of an id_token used for the binding check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTokenBinding {
    /// `alg` from the JOSE header.
    pub alg: String,
    /// `c_hash` claim when present.
    pub c_hash: Option<String>,
}

/// Decodes the header and payload of a compact JWT without verifying it.
///
/// # Errors
///
/// Returns [`RedirectError::Decode`] when the token is not a compact JWT or
/// its segments are not base64url JSON objects.
pub fn decode_id_token(token: &str) -> Result<IdTokenBinding, RedirectError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload)) = (parts.next(), parts.next()) else {
        return Err(RedirectError::Decode("id_token is not a compact jwt".to_string()));
    };
    if header.is_empty() || payload.is_empty() {
        return Err(RedirectError::Decode("id_token is not a compact jwt".to_string()));
    }
    let header = decode_segment(header, "header")?;
    let payload = decode_segment(payload, "payload")?;
    let alg = header
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| RedirectError::Decode("id_token header has no alg".to_string()))?;
    Ok(IdTokenBinding {
        alg: alg.to_string(),
        c_hash: payload.get("c_hash").and_then(Value::as_str).map(str::to_string),
    })
}

/// Decodes one base64url JSON segment, with or without padding.
fn decode_segment(segment: &str, label: &str) -> Result<Value, RedirectError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE.decode(segment))
        .map_err(|err| RedirectError::Decode(format!("{label}: {err}")))?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|err| RedirectError::Decode(format!("{label}: {err}")))?;
    if !value.is_object() {
        return Err(RedirectError::Decode(format!("{label}: not a json object")));
    }
    Ok(value)
}

// ============================================================================
// SECTION: c_hash
// ============================================================================

/// Computes the `c_hash` for `code` under the JOSE algorithm `alg`.
///
/// `*256` algorithms use SHA-256, `*384` SHA-384 and `*512` SHA-512, for the
/// HS, RS, ES and PS families.
///
/// # Errors
///
/// Returns [`RedirectError::UnsupportedAlgorithm`] for any other algorithm.
pub fn calculate_c_hash(alg: &str, code: &str) -> Result<String, RedirectError> {
    let digest = match alg {
        "HS256" | "RS256" | "ES256" | "PS256" => Sha256::digest(code.as_bytes()).to_vec(),
        "HS384" | "RS384" | "ES384" | "PS384" => Sha384::digest(code.as_bytes()).to_vec(),
        "HS512" | "RS512" | "ES512" | "PS512" => Sha512::digest(code.as_bytes()).to_vec(),
        _ => return Err(RedirectError::UnsupportedAlgorithm(alg.to_string())),
    };
    Ok(URL_SAFE_NO_PAD.encode(&digest[.. digest.len() / 2]))
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Context key suffix for a stored id_token.
pub const ID_TOKEN_KEY_SUFFIX: &str = "_id_token";

/// Checks redirect payloads and stores accepted codes.
#[derive(Debug, Clone, Default)]
pub struct RedirectValidator {
    /// Shared run context.
    context: Context,
    /// Consent token sets completed by accepted redirects.
    tokens: TokenCollector,
}

impl RedirectValidator {
    /// Creates a validator writing into `context`.
    #[must_use]
    pub fn new(context: Context) -> Self {
        Self {
            context,
            tokens: TokenCollector::new(),
        }
    }

    /// Records accepted codes whose `state` names a registered set in `tokens`.
    #[must_use]
    pub fn with_token_collector(mut self, tokens: TokenCollector) -> Self {
        self.tokens = tokens;
        self
    }

    /// Returns the context accepted codes are written to.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the consent token collector.
    #[must_use]
    pub const fn tokens(&self) -> &TokenCollector {
        &self.tokens
    }

    /// Checks the c_hash binding and stores the pair on success.
    ///
    /// The code is stored under `state` and the id_token under
    /// `<state>_id_token`. When `state` names a registered token set the
    /// code is also collected for it.
    ///
    /// # Errors
    ///
    /// Returns [`RedirectError`] when `state` is empty, the token cannot be
    /// decoded, its algorithm is unsupported, or a store rejects the write.
    pub fn validate_code(&self, payload: &RedirectCode) -> Result<RedirectOutcome, RedirectError> {
        if payload.state.is_empty() {
            return Err(RedirectError::MissingState);
        }
        let binding = decode_id_token(&payload.id_token)?;
        let expected = calculate_c_hash(&binding.alg, &payload.code)?;
        if binding.c_hash.as_deref() != Some(expected.as_str()) {
            return Ok(RedirectOutcome::CHashInvalid);
        }
        self.context.put(payload.state.clone(), payload.code.clone())?;
        self.context.put(format!("{}{ID_TOKEN_KEY_SUFFIX}", payload.state), payload.id_token.clone())?;
        match self.tokens.collect(&payload.state, payload.code.clone()) {
            Ok(()) | Err(TokenError::UnknownSet(_)) => Ok(RedirectOutcome::Accepted),
            Err(err) => Err(err.into()),
        }
    }
}
