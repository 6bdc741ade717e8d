// crates/ob-conformance-core/src/runtime/controller.rs
// ============================================================================
// Module: Execution Controller
// Description: Sequential prepare/execute/validate loop over generated tests.
// Purpose: Drive a conformance run and assemble its report.
// Dependencies: crate::core, crate::interfaces, crate::runtime::events
// ============================================================================

//! ## Overview
//! The controller runs specifications and their test cases strictly in
//! order, since later cases read context values captured by earlier ones.
//! Each case moves through three stages:
//!
//! - **Prepare** binds context variables. A failure aborts the whole run and
//!   returns the partial report in [`RunAborted`].
//! - **Execute** sends the request. A transport failure fails the case only.
//! - **Validate** judges the response. An error fails the case only.
//!
//! Every outcome is reported to the configured [`RunEventSink`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::context::Context;
use crate::core::context::ContextError;
use crate::core::report::Report;
use crate::core::report::SpecificationResult;
use crate::core::report::TestResult;
use crate::core::response::HttpResponse;
use crate::core::testcase::PrepareError;
use crate::core::testcase::RunDefinition;
use crate::core::testcase::SpecificationTestCases;
use crate::core::testcase::TestCase;
use crate::core::tokens::TokenCollector;
use crate::core::tokens::TokenError;
use crate::interfaces::ResolveError;
use crate::interfaces::ResponseValidator;
use crate::interfaces::TestCaseExecutor;
use crate::interfaces::ValidatorResolver;
use crate::runtime::events::NoopRunEventSink;
use crate::runtime::events::RunEvent;
use crate::runtime::events::RunEventSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Context key holding the signing key pair.
pub const SIGNING_CERT_KEY: &str = "SigningCert";
/// Context key holding the transport key pair.
pub const TRANSPORT_CERT_KEY: &str = "TransportCert";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A test case could not be prepared.
    #[error(transparent)]
    Prepare(#[from] PrepareError),
    /// The run context could not be seeded.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// Required consent token sets have not been granted.
    #[error("consent tokens not collected for: {}", .0.join(", "))]
    TokensPending(Vec<String>),
    /// The token collector could not be read.
    #[error(transparent)]
    Tokens(#[from] TokenError),
}

/// Aborted run with the report built so far.
#[derive(Debug, Error)]
#[error("run aborted: {error}")]
pub struct RunAborted {
    /// Partial report including the aborted test case.
    pub report: Report,
    /// Cause of the abort.
    #[source]
    pub error: RunError,
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Execution controller for conformance runs.
pub struct ExecutionController<E, R> {
    /// Transport used to reach the implementation under test.
    executor: E,
    /// Source of per-specification response validators.
    resolver: R,
    /// Destination for run events.
    events: Arc<dyn RunEventSink>,
    /// Consent tokens that must be collected before a run starts.
    tokens: Option<TokenCollector>,
}

impl<E, R> ExecutionController<E, R>
where
    E: TestCaseExecutor,
    R: ValidatorResolver,
{
    /// Creates a controller that discards run events.
    #[must_use]
    pub fn new(executor: E, resolver: R) -> Self {
        Self {
            executor,
            resolver,
            events: Arc::new(NoopRunEventSink),
            tokens: None,
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn RunEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Requires every set registered in `tokens` to be collected before a run.
    #[must_use]
    pub fn with_token_collector(mut self, tokens: TokenCollector) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs every specification's test cases in declared order.
    ///
    /// # Errors
    ///
    /// Returns [`RunAborted`] when required consent tokens are missing, the
    /// context cannot be seeded, or a test case cannot be prepared. The
    /// partial report is carried in the error.
    pub fn run(&mut self, definition: &RunDefinition, context: &Context) -> Result<Report, RunAborted> {
        let mut report = Report::new();

        if let Err(error) = self.check_tokens() {
            self.record_abort(None, &error.to_string());
            return Err(RunAborted {
                report,
                error,
            });
        }

        if let Err(err) = self.executor.set_certificates(&definition.signing_cert, &definition.transport_cert) {
            let mut event = RunEvent::new("certificates_rejected");
            event.error = Some(err.to_string());
            self.events.record(&event);
        }

        if let Err(err) = seed_context(definition, context) {
            self.record_abort(None, &err.to_string());
            return Err(RunAborted {
                report,
                error: err.into(),
            });
        }

        for spec_tests in &definition.spec_tests {
            let (result, aborted) = self.run_specification(spec_tests, context);
            report.specifications.push(result);
            if let Some(error) = aborted {
                return Err(RunAborted {
                    report,
                    error: error.into(),
                });
            }
        }
        Ok(report)
    }

    /// Fails when a registered consent token set is still pending.
    fn check_tokens(&self) -> Result<(), RunError> {
        let Some(tokens) = &self.tokens else {
            return Ok(());
        };
        let pending = tokens.pending()?;
        if pending.is_empty() { Ok(()) } else { Err(RunError::TokensPending(pending)) }
    }

    /// Runs one specification, returning its result and any fatal error.
    fn run_specification(
        &self,
        spec_tests: &SpecificationTestCases,
        context: &Context,
    ) -> (SpecificationResult, Option<PrepareError>) {
        let spec = &spec_tests.specification;
        let mut result = SpecificationResult::new(spec);
        let mut validator: Option<Result<Arc<dyn ResponseValidator>, ResolveError>> = None;

        let mut event = RunEvent::new("specification_start");
        event.specification = Some(spec.name.clone());
        self.events.record(&event);

        for case in &spec_tests.test_cases {
            let request = match case.prepare(context, &spec_tests.base_uri) {
                Ok(request) => request,
                Err(err) => {
                    result.record(test_result(case, false));
                    self.record_abort(Some(case), &err.to_string());
                    return (result, Some(err));
                }
            };

            let response = match self.executor.execute(&request, context) {
                Ok(response) => response,
                Err(err) => {
                    self.record_outcome(&spec.name, case, None, Some(err.to_string()));
                    result.record(test_result(case, false));
                    continue;
                }
            };

            let outcome = if case.expect.schema_validation {
                let resolved = validator.get_or_insert_with(|| self.resolver.resolve(spec));
                match resolved {
                    Ok(validator) => case.validate(&response, context, Some(validator.as_ref())),
                    Err(err) => {
                        self.record_outcome(&spec.name, case, Some(&response), Some(err.to_string()));
                        result.record(test_result(case, false));
                        continue;
                    }
                }
            } else {
                case.validate(&response, context, None)
            };

            match outcome {
                Ok(verdict) => {
                    let error = (!verdict.pass).then(|| verdict.reasons.join("; "));
                    self.record_outcome(&spec.name, case, Some(&response), error);
                    result.record(test_result(case, verdict.pass));
                }
                Err(err) => {
                    self.record_outcome(&spec.name, case, Some(&response), Some(err.to_string()));
                    result.record(test_result(case, false));
                }
            }
        }
        (result, None)
    }

    /// Records a pass or fail event for a test case.
    fn record_outcome(
        &self,
        specification: &str,
        case: &TestCase,
        response: Option<&HttpResponse>,
        error: Option<String>,
    ) {
        let mut event = RunEvent::new(if error.is_none() { "test_case_pass" } else { "test_case_fail" });
        event.specification = Some(specification.to_string());
        event.test_case = Some(case.name.clone());
        event.test_id = Some(case.id.clone());
        event.method = Some(case.input.method.clone());
        event.endpoint = Some(case.input.endpoint.clone());
        event.expected_status = Some(case.expect.status_code);
        if let Some(response) = response {
            event.status_code = Some(response.status_code);
            event.response_time_ms = Some(response.elapsed.as_millis());
            event.response_size = Some(response.body.len());
        }
        event.error = error;
        self.events.record(&event);
    }

    /// Records a run abort.
    fn record_abort(&self, case: Option<&TestCase>, error: &str) {
        let mut event = RunEvent::new("run_aborted");
        if let Some(case) = case {
            event.test_case = Some(case.name.clone());
            event.test_id = Some(case.id.clone());
            event.method = Some(case.input.method.clone());
            event.endpoint = Some(case.input.endpoint.clone());
        }
        event.error = Some(error.to_string());
        self.events.record(&event);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Seeds certificates and custom-test replacements into the context.
fn seed_context(definition: &RunDefinition, context: &Context) -> Result<(), ContextError> {
    context.put(SIGNING_CERT_KEY, definition.signing_cert.to_value())?;
    context.put(TRANSPORT_CERT_KEY, definition.transport_cert.to_value())?;
    for custom in definition.discovery.discovery_model.custom_tests() {
        context.extend(custom.replacements.iter().map(|(key, value)| (key.clone(), value.clone())))?;
    }
    Ok(())
}

/// Builds a report entry for a test case.
fn test_result(case: &TestCase, pass: bool) -> TestResult {
    TestResult {
        id: case.id.clone(),
        name: case.name.clone(),
        endpoint: case.endpoint_label(),
        pass,
    }
}
