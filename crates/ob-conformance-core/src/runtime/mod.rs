// crates/ob-conformance-core/src/runtime/mod.rs
// ============================================================================
// Module: OB Conformance Runtime
// Description: Discovery validation, field resolution, and run execution.
// Purpose: Implement the validation-and-execution pipeline over the model.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime modules hold the pipeline logic. They depend only on the model
//! and on the collaborator traits in [`crate::interfaces`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod controller;
pub mod discovery_validator;
pub mod events;
pub mod field_rules;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use controller::ExecutionController;
pub use controller::RunAborted;
pub use controller::RunError;
pub use controller::SIGNING_CERT_KEY;
pub use controller::TRANSPORT_CERT_KEY;
pub use discovery_validator::validate_discovery;
pub use discovery_validator::validate_discovery_json;
pub use events::FileRunEventSink;
pub use events::MemoryRunEventSink;
pub use events::NoopRunEventSink;
pub use events::RunEvent;
pub use events::RunEventSink;
pub use events::StderrRunEventSink;
pub use field_rules::field_rules;
