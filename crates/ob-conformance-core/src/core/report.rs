// crates/ob-conformance-core/src/core/report.rs
// ============================================================================
// Module: Run Report
// Description: Aggregated pass/fail results for a conformance run.
// Purpose: Serialize per-specification and per-test-case outcomes.
// Dependencies: serde, time, uuid
// ============================================================================

//! ## Overview
//! A [`Report`] owns a run identifier and one [`SpecificationResult`] per
//! specification exercised. Aggregate pass flags are derived from the
//! contained tests and are vacuously true for an empty set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::core::discovery::ApiSpecification;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Conformance run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Unique run identifier.
    pub id: Uuid,
    /// RFC 3339 timestamp at report creation.
    pub generated_at: String,
    /// Per-specification results in run order.
    pub specifications: Vec<SpecificationResult>,
}

impl Report {
    /// Creates an empty report with a fresh v4 identifier.
    #[must_use]
    pub fn new() -> Self {
        let generated_at =
            OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::from("unknown"));
        Self {
            id: Uuid::new_v4(),
            generated_at,
            specifications: Vec::new(),
        }
    }

    /// Returns true when every specification passed.
    #[must_use]
    pub fn pass(&self) -> bool {
        self.specifications.iter().all(|spec| spec.pass)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

/// Results for one specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationResult {
    /// Specification name.
    pub name: String,
    /// Specification version.
    pub version: String,
    /// Specification documentation URL.
    pub url: String,
    /// OpenAPI document URL.
    pub schema_version: String,
    /// True iff every test passed.
    pub pass: bool,
    /// Per-test results in declared order.
    pub tests: Vec<TestResult>,
}

impl SpecificationResult {
    /// Creates an empty, passing result for a specification.
    #[must_use]
    pub fn new(spec: &ApiSpecification) -> Self {
        Self {
            name: spec.name.clone(),
            version: spec.version.clone(),
            url: spec.url.clone(),
            schema_version: spec.schema_version.clone(),
            pass: true,
            tests: Vec::new(),
        }
    }

    /// Appends a test result and refreshes the aggregate flag.
    pub fn record(&mut self, result: TestResult) {
        self.pass = self.pass && result.pass;
        self.tests.push(result);
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test case identifier.
    pub id: String,
    /// Test case name.
    pub name: String,
    /// `"METHOD /path"` of the request.
    pub endpoint: String,
    /// Whether the case passed.
    pub pass: bool,
}
