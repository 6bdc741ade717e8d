// crates/ob-conformance-server/src/audit.rs
// ============================================================================
// Module: Redirect Audit Logging
// Description: Structured audit events for inbound authorization redirects.
// Purpose: Emit JSON-line records of every redirect outcome without secrets.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every redirect the server receives produces one [`RedirectAuditEvent`].
//! Events name the channel, the outcome, and the client `state`. Codes and
//! id_tokens are never recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Channel a redirect arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectChannel {
    /// Parameters delivered in the URL fragment.
    Fragment,
    /// Parameters delivered in the query string.
    Query,
    /// Error-shaped redirect.
    Error,
}

/// Result recorded for a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectAuditOutcome {
    /// Code accepted and stored.
    Accepted,
    /// c_hash missing or mismatched.
    CHashInvalid,
    /// Error payload acknowledged.
    Acknowledged,
    /// Payload or token could not be processed.
    Rejected,
}

/// Redirect audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Channel the redirect arrived on.
    pub channel: RedirectChannel,
    /// Recorded outcome.
    pub outcome: RedirectAuditOutcome,
    /// Client state, when the payload carried one.
    pub state: Option<String>,
    /// OAuth error code for error-shaped redirects.
    pub oauth_error: Option<String>,
    /// Error kind for rejected redirects.
    pub error_kind: Option<&'static str>,
}

impl RedirectAuditEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(channel: RedirectChannel, outcome: RedirectAuditOutcome) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "redirect_received",
            timestamp_ms,
            channel,
            outcome,
            state: None,
            oauth_error: None,
            error_kind: None,
        }
    }

    /// Attaches the client state. Empty states are omitted.
    #[must_use]
    pub fn with_state(mut self, state: &str) -> Self {
        self.state = (!state.is_empty()).then(|| state.to_string());
        self
    }

    /// Attaches the OAuth error code.
    #[must_use]
    pub fn with_oauth_error(mut self, error: &str) -> Self {
        self.oauth_error = (!error.is_empty()).then(|| error.to_string());
        self
    }

    /// Attaches the error kind.
    #[must_use]
    pub const fn with_error_kind(mut self, kind: &'static str) -> Self {
        self.error_kind = Some(kind);
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Redirect audit sink.
pub trait RedirectAuditSink: Send + Sync {
    /// Record a redirect audit event.
    fn record(&self, event: &RedirectAuditEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrRedirectAuditSink;

impl RedirectAuditSink for StderrRedirectAuditSink {
    fn record(&self, event: &RedirectAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileRedirectAuditSink {
    /// Append-only log handle.
    file: Mutex<std::fs::File>,
}

impl FileRedirectAuditSink {
    /// Opens the audit log in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RedirectAuditSink for FileRedirectAuditSink {
    fn record(&self, event: &RedirectAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op sink.
pub struct NoopRedirectAuditSink;

impl RedirectAuditSink for NoopRedirectAuditSink {
    fn record(&self, _event: &RedirectAuditEvent) {}
}
