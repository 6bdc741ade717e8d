// crates/ob-conformance-core/src/lib.rs
// ============================================================================
// Module: OB Conformance Core Library
// Description: Public API surface for the conformance engine core.
// Purpose: Expose the data model, collaborator interfaces, and runtime pipeline.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The conformance core validates discovery models, derives the configuration
//! fields an operator must supply, and drives generated test cases against an
//! implementation under test. Transport, schema loading, and conditionality
//! lookups are reached only through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ConditionalityChecker;
pub use interfaces::ConditionalityError;
pub use interfaces::ExecuteError;
pub use interfaces::ResolveError;
pub use interfaces::ResponseValidator;
pub use interfaces::SchemaFailure;
pub use interfaces::SchemaValidationError;
pub use interfaces::TestCaseExecutor;
pub use interfaces::ValidatorResolver;
pub use runtime::ExecutionController;
pub use runtime::FileRunEventSink;
pub use runtime::MemoryRunEventSink;
pub use runtime::NoopRunEventSink;
pub use runtime::RunAborted;
pub use runtime::RunError;
pub use runtime::RunEvent;
pub use runtime::RunEventSink;
pub use runtime::StderrRunEventSink;
pub use runtime::field_rules;
pub use runtime::validate_discovery;
pub use runtime::validate_discovery_json;
