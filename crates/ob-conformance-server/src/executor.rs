// crates/ob-conformance-server/src/executor.rs
// ============================================================================
// Module: HTTP Test Case Executor
// Description: Blocking reqwest transport for prepared conformance requests.
// Purpose: Send bound requests to the implementation under test with limits.
// Dependencies: ob-conformance-core, reqwest, serde
// ============================================================================

//! ## Overview
//! [`HttpTestCaseExecutor`] implements the core [`TestCaseExecutor`] seam. It
//! sends one request per call, never follows redirects, and caps the response
//! body at `max_response_bytes`. Cleartext `http://` targets are refused
//! unless `allow_http` is set. When a transport key pair is installed the
//! client is rebuilt to present it for mutual TLS.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;
use std::time::Instant;

use ob_conformance_core::Certificate;
use ob_conformance_core::Context;
use ob_conformance_core::ExecuteError;
use ob_conformance_core::HttpResponse;
use ob_conformance_core::PreparedRequest;
use ob_conformance_core::TestCaseExecutor;
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Deserialize;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Outbound transport settings.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` URLs.
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpExecutorConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Allow cleartext HTTP.
    #[serde(default)]
    pub allow_http: bool,
    /// User agent for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for HttpExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            allow_http: false,
            user_agent: default_user_agent(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default user agent.
fn default_user_agent() -> String {
    format!("ob-conformance/{}", env!("CARGO_PKG_VERSION"))
}

/// Default response size cap.
const fn default_max_response_bytes() -> usize {
    10 * 1024 * 1024
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Blocking HTTP executor for conformance test cases.
pub struct HttpTestCaseExecutor {
    /// Transport settings.
    config: HttpExecutorConfig,
    /// Client, rebuilt when certificates change.
    client: Client,
}

impl HttpTestCaseExecutor {
    /// Creates an executor without a client identity.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::Transport`] when the client cannot be built.
    pub fn new(config: HttpExecutorConfig) -> Result<Self, ExecuteError> {
        let client = build_http_client(&config, None)?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Returns the transport settings.
    #[must_use]
    pub const fn config(&self) -> &HttpExecutorConfig {
        &self.config
    }
}

impl TestCaseExecutor for HttpTestCaseExecutor {
    fn set_certificates(&mut self, _signing: &Certificate, transport: &Certificate) -> Result<(), ExecuteError> {
        if transport.public_pem.trim().is_empty() && transport.private_pem.trim().is_empty() {
            return Ok(());
        }
        let pem = format!("{}\n{}", transport.private_pem.trim(), transport.public_pem.trim());
        let identity =
            reqwest::Identity::from_pem(pem.as_bytes()).map_err(|err| ExecuteError::Certificate(err.to_string()))?;
        self.client = build_http_client(&self.config, Some(identity))?;
        Ok(())
    }

    fn execute(&self, request: &PreparedRequest, _context: &Context) -> Result<HttpResponse, ExecuteError> {
        let url = Url::parse(&request.url).map_err(|err| ExecuteError::Request(format!("url: {err}")))?;
        validate_url(&url, &self.config)?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ExecuteError::Request(format!("method: {}", request.method)))?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let started = Instant::now();
        let mut response = builder.send().map_err(|err| ExecuteError::Transport(err.to_string()))?;
        let mut captured = HttpResponse::new(&request.method, &request.path, response.status().as_u16());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                captured
                    .headers
                    .entry(name.as_str().to_ascii_lowercase())
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }
        }
        captured.body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        captured.elapsed = started.elapsed();
        Ok(captured)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a client with redirects disabled and an optional identity.
fn build_http_client(
    config: &HttpExecutorConfig,
    identity: Option<reqwest::Identity>,
) -> Result<Client, ExecuteError> {
    let mut builder = Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .redirect(Policy::none());
    if let Some(identity) = identity {
        builder = builder.identity(identity);
    }
    builder.build().map_err(|err| ExecuteError::Transport(format!("http client build failed: {err}")))
}

/// Enforces the scheme policy.
fn validate_url(url: &Url, config: &HttpExecutorConfig) -> Result<(), ExecuteError> {
    match url.scheme() {
        "https" => Ok(()),
        "http" if config.allow_http => Ok(()),
        scheme => Err(ExecuteError::Request(format!("unsupported url scheme: {scheme}"))),
    }
}

/// Reads at most `max_bytes` of the body, failing on overflow or truncation.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, ExecuteError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| ExecuteError::TooLarge)?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(ExecuteError::TooLarge);
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|err| ExecuteError::Transport(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(ExecuteError::TooLarge);
    }
    if let Some(expected) = expected_len
        && u64::try_from(buf.len()).unwrap_or(u64::MAX) < expected
    {
        return Err(ExecuteError::Transport("http response truncated".to_string()));
    }
    Ok(buf)
}
