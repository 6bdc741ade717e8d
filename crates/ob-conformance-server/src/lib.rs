// crates/ob-conformance-server/src/lib.rs
// ============================================================================
// Module: OB Conformance Server
// Description: Redirect validation, HTTP transport, and the conformance API.
// Purpose: Connect the conformance core to the network.
// Dependencies: ob-conformance-core, ob-conformance-schema, axum, reqwest, tokio
// ============================================================================

//! ## Overview
//! This crate holds everything that touches the network. The
//! [`RedirectValidator`] checks hybrid-flow code bindings, the
//! [`HttpTestCaseExecutor`] sends prepared requests to the implementation
//! under test, and [`server`] exposes redirect and discovery endpoints.
//! [`ConformanceConfig`] wires them together from a TOML file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod executor;
pub mod redirect;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileRedirectAuditSink;
pub use audit::NoopRedirectAuditSink;
pub use audit::RedirectAuditEvent;
pub use audit::RedirectAuditOutcome;
pub use audit::RedirectAuditSink;
pub use audit::RedirectChannel;
pub use audit::StderrRedirectAuditSink;
pub use config::ConfigError;
pub use config::ConformanceConfig;
pub use executor::HttpExecutorConfig;
pub use executor::HttpTestCaseExecutor;
pub use redirect::RedirectCode;
pub use redirect::RedirectError;
pub use redirect::RedirectErrorPayload;
pub use redirect::RedirectOutcome;
pub use redirect::RedirectValidator;
pub use redirect::calculate_c_hash;
pub use redirect::decode_id_token;
pub use server::AppState;
pub use server::ServerError;
pub use server::router;
pub use server::serve;
