// crates/ob-conformance-core/tests/execution_controller.rs
// ============================================================================
// Module: Execution Controller Tests
// Description: Run-level behavior of the prepare/execute/validate loop.
// Purpose: Validate continuation after transport failures and prepare aborts.
// Dependencies: ob-conformance-core
// ============================================================================

//! ## Overview
//! Drives the controller with a scripted executor and resolver and checks the
//! resulting report, context seeding, and emitted run events.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use ob_conformance_core::ApiSpecification;
use ob_conformance_core::Certificate;
use ob_conformance_core::Context;
use ob_conformance_core::ContextPut;
use ob_conformance_core::CustomTest;
use ob_conformance_core::DiscoveryModel;
use ob_conformance_core::ExecuteError;
use ob_conformance_core::ExecutionController;
use ob_conformance_core::Expect;
use ob_conformance_core::HttpResponse;
use ob_conformance_core::Input;
use ob_conformance_core::MemoryRunEventSink;
use ob_conformance_core::Model;
use ob_conformance_core::PrepareError;
use ob_conformance_core::PreparedRequest;
use ob_conformance_core::ResolveError;
use ob_conformance_core::ResponseValidator;
use ob_conformance_core::RunDefinition;
use ob_conformance_core::RunError;
use ob_conformance_core::SchemaFailure;
use ob_conformance_core::SchemaValidationError;
use ob_conformance_core::SpecificationTestCases;
use ob_conformance_core::TestCase;
use ob_conformance_core::TestCaseExecutor;
use ob_conformance_core::TokenCollector;

// ============================================================================
// SECTION: Doubles
// ============================================================================

/// Executor that fails for listed paths and echoes 200 otherwise.
#[derive(Default)]
struct ScriptedExecutor {
    failing_paths: BTreeSet<String>,
    body: String,
    sent: Mutex<Vec<String>>,
    certificates_set: bool,
}

impl TestCaseExecutor for ScriptedExecutor {
    fn set_certificates(&mut self, _signing: &Certificate, _transport: &Certificate) -> Result<(), ExecuteError> {
        self.certificates_set = true;
        Ok(())
    }

    fn execute(&self, request: &PreparedRequest, _context: &Context) -> Result<HttpResponse, ExecuteError> {
        self.sent.lock().unwrap().push(request.url.clone());
        if self.failing_paths.contains(&request.path) {
            return Err(ExecuteError::Transport("connection reset".to_string()));
        }
        Ok(HttpResponse::new(&request.method, &request.path, 200)
            .with_header("content-type", "application/json")
            .with_body(self.body.clone()))
    }
}

struct PassingValidator;

impl ResponseValidator for PassingValidator {
    fn validate(&self, _response: &HttpResponse) -> Result<Vec<SchemaFailure>, SchemaValidationError> {
        Ok(Vec::new())
    }
}

fn passing_resolver(_spec: &ApiSpecification) -> Result<Arc<dyn ResponseValidator>, ResolveError> {
    Ok(Arc::new(PassingValidator))
}

fn failing_resolver(_spec: &ApiSpecification) -> Result<Arc<dyn ResponseValidator>, ResolveError> {
    Err(ResolveError("schema: could not find spec file".to_string()))
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn case(id: &str, endpoint: &str) -> TestCase {
    TestCase {
        id: id.to_string(),
        name: format!("case {id}"),
        input: Input {
            method: "GET".to_string(),
            endpoint: endpoint.to_string(),
            headers: BTreeMap::new(),
            body: None,
        },
        expect: Expect {
            status_code: 200,
            schema_validation: false,
            matches: Vec::new(),
        },
        context_put: Vec::new(),
    }
}

fn spec() -> ApiSpecification {
    ApiSpecification {
        name: "Account and Transaction API Specification".to_string(),
        url: "https://example.com/spec".to_string(),
        version: "v3.1".to_string(),
        schema_version: "https://example.com/account-info-swagger.json".to_string(),
    }
}

fn definition(cases: Vec<TestCase>) -> RunDefinition {
    RunDefinition {
        discovery: Model {
            discovery_model: DiscoveryModel {
                custom_tests: Some(vec![CustomTest {
                    name: "replacements".to_string(),
                    description: String::new(),
                    replacements: BTreeMap::from([("account_id".to_string(), "500000000000000000000001".to_string())]),
                }]),
                ..DiscoveryModel::default()
            },
        },
        spec_tests: vec![SpecificationTestCases {
            specification: spec(),
            base_uri: "https://bank.example/open-banking/v3.1/aisp".to_string(),
            test_cases: cases,
        }],
        signing_cert: Certificate {
            public_pem: "signing-public".to_string(),
            private_pem: "signing-private".to_string(),
        },
        transport_cert: Certificate::default(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn execute_failure_fails_only_that_case() {
    let executor = ScriptedExecutor {
        failing_paths: BTreeSet::from(["/open-banking/v3.1/aisp/accounts/b".to_string()]),
        ..ScriptedExecutor::default()
    };
    let sink = Arc::new(MemoryRunEventSink::new());
    let mut controller = ExecutionController::new(executor, passing_resolver).with_event_sink(sink.clone());
    let run = definition(vec![case("1", "/accounts/a"), case("2", "/accounts/b"), case("3", "/accounts/c")]);

    let report = controller.run(&run, &Context::new()).unwrap();

    let spec = &report.specifications[0];
    assert!(!spec.pass);
    let outcomes = spec.tests.iter().map(|test| (test.id.as_str(), test.pass)).collect::<Vec<_>>();
    assert_eq!(outcomes, vec![("1", true), ("2", false), ("3", true)]);
    assert_eq!(spec.tests[1].endpoint, "GET /accounts/b");
    assert_eq!(controller.executor().sent.lock().unwrap().len(), 3);

    let events = sink.events();
    let kinds = events.iter().map(|event| event.event).collect::<Vec<_>>();
    assert_eq!(kinds, vec!["specification_start", "test_case_pass", "test_case_fail", "test_case_pass"]);
    assert_eq!(events[2].error.as_deref(), Some("transport error: connection reset"));
    assert_eq!(events[2].test_id.as_deref(), Some("2"));
    assert_eq!(events[2].test_case.as_deref(), Some("case 2"));
}

#[test]
fn prepare_failure_aborts_with_partial_report() {
    let mut controller = ExecutionController::new(ScriptedExecutor::default(), passing_resolver);
    let run = definition(vec![case("1", "/accounts"), case("2", "/accounts/$missing"), case("3", "/accounts")]);

    let aborted = controller.run(&run, &Context::new()).unwrap_err();

    assert!(matches!(aborted.error, RunError::Prepare(PrepareError::UnresolvedVariable(ref name)) if name == "missing"));
    let spec = &aborted.report.specifications[0];
    assert_eq!(spec.tests.len(), 2);
    assert!(spec.tests[0].pass);
    assert!(!spec.tests[1].pass);
    assert!(!spec.pass);
    assert_eq!(controller.executor().sent.lock().unwrap().len(), 1);
}

#[test]
fn context_is_seeded_before_the_first_case() {
    let mut controller = ExecutionController::new(ScriptedExecutor::default(), passing_resolver);
    let run = definition(vec![case("1", "/accounts/$account_id")]);
    let context = Context::new();

    let report = controller.run(&run, &context).unwrap();

    assert!(report.pass());
    assert!(controller.executor().certificates_set);
    assert_eq!(context.get("SigningCert").unwrap()["public"], "signing-public");
    assert!(context.get("TransportCert").is_ok());
    let sent = controller.executor().sent.lock().unwrap().clone();
    assert_eq!(sent, vec!["https://bank.example/open-banking/v3.1/aisp/accounts/500000000000000000000001"]);
}

#[test]
fn captured_values_flow_into_later_cases() {
    let executor = ScriptedExecutor {
        body: r#"{"Data":{"ConsentId":"aac-42"}}"#.to_string(),
        ..ScriptedExecutor::default()
    };
    let mut controller = ExecutionController::new(executor, passing_resolver);
    let mut create = case("1", "/account-access-consents");
    create.context_put = vec![ContextPut {
        name: "consent_id".to_string(),
        json: "$.Data.ConsentId".to_string(),
    }];
    let run = definition(vec![create, case("2", "/account-access-consents/$consent_id")]);

    let report = controller.run(&run, &Context::new()).unwrap();

    assert!(report.pass());
    let sent = controller.executor().sent.lock().unwrap().clone();
    assert!(sent[1].ends_with("/account-access-consents/aac-42"));
}

#[test]
fn unresolvable_validator_fails_schema_cases_and_continues() {
    let mut controller = ExecutionController::new(ScriptedExecutor::default(), failing_resolver);
    let mut schema_case = case("1", "/accounts");
    schema_case.expect.schema_validation = true;
    let run = definition(vec![schema_case, case("2", "/accounts")]);

    let report = controller.run(&run, &Context::new()).unwrap();

    let spec = &report.specifications[0];
    assert!(!spec.tests[0].pass);
    assert!(spec.tests[1].pass);
    assert!(!spec.pass);
}

#[test]
fn empty_specification_passes_vacuously() {
    let mut controller = ExecutionController::new(ScriptedExecutor::default(), passing_resolver);

    let report = controller.run(&definition(Vec::new()), &Context::new()).unwrap();

    assert!(report.specifications[0].pass);
    assert!(report.specifications[0].tests.is_empty());
    assert_eq!(report.id.get_version_num(), 4);
}

#[test]
fn pending_consent_tokens_abort_before_any_request() {
    let tokens = TokenCollector::with_sets(["accounts", "payments"]);
    tokens.collect("accounts", "code-1").unwrap();
    let sink = Arc::new(MemoryRunEventSink::new());
    let mut controller = ExecutionController::new(ScriptedExecutor::default(), passing_resolver)
        .with_event_sink(sink.clone())
        .with_token_collector(tokens);

    let aborted = controller.run(&definition(vec![case("1", "/accounts")]), &Context::new()).unwrap_err();

    assert!(matches!(aborted.error, RunError::TokensPending(ref pending) if pending == &["payments".to_string()]));
    assert_eq!(aborted.error.to_string(), "consent tokens not collected for: payments");
    assert!(aborted.report.specifications.is_empty());
    assert!(controller.executor().sent.lock().unwrap().is_empty());
    assert_eq!(sink.events().last().unwrap().event, "run_aborted");
}

#[test]
fn collected_consent_tokens_let_the_run_proceed() {
    let tokens = TokenCollector::with_sets(["accounts"]);
    let mut controller =
        ExecutionController::new(ScriptedExecutor::default(), passing_resolver).with_token_collector(tokens.clone());
    tokens.collect("accounts", "code-1").unwrap();

    let report = controller.run(&definition(vec![case("1", "/accounts")]), &Context::new()).unwrap();

    assert!(report.specifications[0].pass);
}
