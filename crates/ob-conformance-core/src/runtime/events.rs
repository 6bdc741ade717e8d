// crates/ob-conformance-core/src/runtime/events.rs
// ============================================================================
// Module: Run Events
// Description: Structured events emitted while executing a conformance run.
// Purpose: Record per-test-case outcomes as JSON lines without a global logger.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The execution controller reports every test case outcome through a
//! [`RunEventSink`]. Events carry identifying metadata and timing only;
//! request bodies, tokens, and certificates are never included.

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

/// Run event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Specification name when the event is scoped to one.
    pub specification: Option<String>,
    /// Test case display name.
    pub test_case: Option<String>,
    /// Stable test case identifier, for example `OB-301-ACC-100100`.
    pub test_id: Option<String>,
    /// Request method.
    pub method: Option<String>,
    /// Request endpoint template.
    pub endpoint: Option<String>,
    /// Expected status code.
    pub expected_status: Option<u16>,
    /// Observed status code.
    pub status_code: Option<u16>,
    /// Response time in milliseconds.
    pub response_time_ms: Option<u128>,
    /// Response body size in bytes.
    pub response_size: Option<usize>,
    /// Error or failure description.
    pub error: Option<String>,
}

impl RunEvent {
    /// Creates an event with a consistent timestamp and no metadata.
    #[must_use]
    pub fn new(event: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            specification: None,
            test_case: None,
            test_id: None,
            method: None,
            endpoint: None,
            expected_status: None,
            status_code: None,
            response_time_ms: None,
            response_size: None,
            error: None,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Run event sink.
pub trait RunEventSink: Send + Sync {
    /// Record a run event.
    fn record(&self, event: &RunEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrRunEventSink;

impl RunEventSink for StderrRunEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileRunEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileRunEventSink {
    /// Opens the event log in append mode.
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

impl RunEventSink for FileRunEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op sink.
pub struct NoopRunEventSink;

impl RunEventSink for NoopRunEventSink {
    fn record(&self, _event: &RunEvent) {}
}

/// Sink that keeps events in memory for inspection.
#[derive(Default)]
pub struct MemoryRunEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryRunEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl RunEventSink for MemoryRunEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
