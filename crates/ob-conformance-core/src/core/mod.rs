// crates/ob-conformance-core/src/core/mod.rs
// ============================================================================
// Module: OB Conformance Data Model
// Description: Discovery, registry, context, token, test case, and report types.
// Purpose: Group the serializable model shared by every pipeline stage.
// Dependencies: serde, serde_json, uuid
// ============================================================================

//! ## Overview
//! Model types are plain data. Validation and execution live in
//! [`crate::runtime`]; this module only describes shapes and simple accessors.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod config_field;
pub mod context;
pub mod discovery;
pub mod failure;
pub mod report;
pub mod response;
pub mod specification;
pub mod testcase;
pub mod tokens;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config_field::ConfigField;
pub use config_field::CustomCondition;
pub use config_field::Rule;
pub use context::Context;
pub use context::ContextError;
pub use discovery::ApiSpecification;
pub use discovery::ConditionalProperty;
pub use discovery::CustomTest;
pub use discovery::DiscoveryError;
pub use discovery::DiscoveryItem;
pub use discovery::DiscoveryModel;
pub use discovery::Endpoint;
pub use discovery::Model;
pub use failure::ValidationFailure;
pub use report::Report;
pub use report::SpecificationResult;
pub use report::TestResult;
pub use response::HttpResponse;
pub use specification::RegistryError;
pub use specification::Specification;
pub use testcase::Certificate;
pub use testcase::ContextPut;
pub use testcase::Expect;
pub use testcase::Input;
pub use testcase::Match;
pub use testcase::PrepareError;
pub use testcase::PreparedRequest;
pub use testcase::RunDefinition;
pub use testcase::SpecificationTestCases;
pub use testcase::TestCase;
pub use testcase::ValidateError;
pub use testcase::Verdict;
pub use tokens::TokenCollector;
pub use tokens::TokenError;
