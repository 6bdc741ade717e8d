// crates/ob-conformance-core/src/runtime/discovery_validator.rs
// ============================================================================
// Module: Discovery Validator
// Description: Structural and conditionality validation of discovery models.
// Purpose: Enumerate every rule violation in a discovery document at once.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Validation runs in two phases. The structural phase checks required
//! fields, supported versions, and registry consistency across the whole
//! document. The conditionality phase asks the [`ConditionalityChecker`]
//! about every endpoint and then about missing mandatory endpoints per item.
//!
//! The conditionality phase only runs when the structural phase is clean,
//! since it depends on a trustworthy specification name. Failures are data:
//! the `Result` error of [`validate_discovery_json`] is reserved for
//! malformed input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::discovery::ApiSpecification;
use crate::core::discovery::DiscoveryError;
use crate::core::discovery::DiscoveryItem;
use crate::core::discovery::Model;
use crate::core::discovery::is_supported_version;
use crate::core::failure::ValidationFailure;
use crate::core::specification::specification_from_schema_version;
use crate::interfaces::ConditionalityChecker;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Root key for failure paths.
const ROOT: &str = "DiscoveryModel";

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Parses and validates a discovery document.
///
/// # Errors
///
/// Returns [`DiscoveryError::Parse`] only when the JSON is malformed.
pub fn validate_discovery_json<C>(
    checker: &C,
    document: &str,
) -> Result<(bool, Vec<ValidationFailure>), DiscoveryError>
where
    C: ConditionalityChecker + ?Sized,
{
    let model = Model::from_json(document)?;
    Ok(validate_discovery(checker, &model))
}

/// Validates a parsed discovery model.
///
/// Returns `(all_passed, failures)` with failures in document order.
#[must_use]
pub fn validate_discovery<C>(checker: &C, model: &Model) -> (bool, Vec<ValidationFailure>)
where
    C: ConditionalityChecker + ?Sized,
{
    let mut failures = Vec::new();
    validate_structure(model, &mut failures);
    if failures.is_empty() {
        validate_conditionality(checker, model, &mut failures);
    }
    (failures.is_empty(), failures)
}

// ============================================================================
// SECTION: Structural Phase
// ============================================================================

/// Records structural failures across the whole document.
fn validate_structure(model: &Model, failures: &mut Vec<ValidationFailure>) {
    let body = &model.discovery_model;
    require_text(failures, ROOT, "Name", &body.name);
    require_text(failures, ROOT, "Description", &body.description);
    if body.discovery_version.is_empty() {
        failures.push(required(ROOT, "DiscoveryVersion"));
    } else if !is_supported_version(&body.discovery_version) {
        failures.push(ValidationFailure::new(
            format!("{ROOT}.DiscoveryVersion"),
            format!("DiscoveryVersion '{}' not in list of supported versions", body.discovery_version),
        ));
    }

    match &body.discovery_items {
        None => failures.push(required(ROOT, "DiscoveryItems")),
        Some(items) if items.is_empty() => failures.push(greater_than(ROOT, "DiscoveryItems")),
        Some(items) => {
            for (index, item) in items.iter().enumerate() {
                validate_item_structure(&item_key(index), item, failures);
            }
        }
    }
}

/// Records structural failures for one discovery item.
fn validate_item_structure(key: &str, item: &DiscoveryItem, failures: &mut Vec<ValidationFailure>) {
    validate_api_specification(&format!("{key}.APISpecification"), &item.api_specification, failures);
    match &item.endpoints {
        None => failures.push(required(key, "Endpoints")),
        Some(endpoints) if endpoints.is_empty() => failures.push(greater_than(key, "Endpoints")),
        Some(endpoints) => {
            for (index, endpoint) in endpoints.iter().enumerate() {
                let endpoint_key = format!("{key}.Endpoints[{index}]");
                require_text(failures, &endpoint_key, "Method", &endpoint.method);
                require_text(failures, &endpoint_key, "Path", &endpoint.path);
            }
        }
    }
}

/// Checks required specification fields and registry consistency.
fn validate_api_specification(key: &str, spec: &ApiSpecification, failures: &mut Vec<ValidationFailure>) {
    require_text(failures, key, "Name", &spec.name);
    require_text(failures, key, "URL", &spec.url);
    require_text(failures, key, "Version", &spec.version);
    require_text(failures, key, "SchemaVersion", &spec.schema_version);
    if spec.schema_version.is_empty() {
        return;
    }

    let Ok(registered) = specification_from_schema_version(&spec.schema_version) else {
        failures.push(ValidationFailure::new(
            format!("{key}.SchemaVersion"),
            format!("'SchemaVersion' not supported by suite '{}'", spec.schema_version),
        ));
        return;
    };
    let checks = [
        ("Name", spec.name.as_str(), registered.name),
        ("Version", spec.version.as_str(), registered.version),
        ("URL", spec.url.as_str(), registered.url),
    ];
    for (field, actual, expected) in checks {
        if !actual.is_empty() && actual != expected {
            failures.push(ValidationFailure::new(
                format!("{key}.{field}"),
                format!(
                    "'{field}' should be '{expected}' when schemaVersion is '{}'",
                    spec.schema_version
                ),
            ));
        }
    }
}

// ============================================================================
// SECTION: Conditionality Phase
// ============================================================================

/// Records conditionality failures for every item.
fn validate_conditionality<C>(checker: &C, model: &Model, failures: &mut Vec<ValidationFailure>)
where
    C: ConditionalityChecker + ?Sized,
{
    for (item_index, item) in model.discovery_model.items().iter().enumerate() {
        let key = item_key(item_index);
        let spec_name = item.api_specification.name.as_str();
        let endpoints = item.endpoints();

        for (index, endpoint) in endpoints.iter().enumerate() {
            let endpoint_key = format!("{key}.Endpoints[{index}]");
            match checker.is_present(&endpoint.method, &endpoint.path, spec_name) {
                Err(err) => failures.push(ValidationFailure::new(endpoint_key, err.to_string())),
                Ok(false) => failures.push(ValidationFailure::new(
                    endpoint_key,
                    format!("Invalid endpoint Method='{}', Path='{}'", endpoint.method, endpoint.path),
                )),
                Ok(true) => {}
            }
        }

        let collection_key = format!("{key}.Endpoints");
        match checker.missing_mandatory(endpoints, spec_name) {
            Err(err) => failures.push(ValidationFailure::new(collection_key, err.to_string())),
            Ok(missing) => {
                for endpoint in missing {
                    failures.push(ValidationFailure::new(
                        collection_key.clone(),
                        format!(
                            "Missing mandatory endpoint Method='{}', Path='{}'",
                            endpoint.method, endpoint.path
                        ),
                    ));
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the key for a discovery item.
fn item_key(index: usize) -> String {
    format!("{ROOT}.DiscoveryItems[{index}]")
}

/// Records a `required` failure when the value is empty.
fn require_text(failures: &mut Vec<ValidationFailure>, parent: &str, field: &str, value: &str) {
    if value.is_empty() {
        failures.push(required(parent, field));
    }
}

/// Builds a `required` tag failure.
fn required(parent: &str, field: &str) -> ValidationFailure {
    ValidationFailure::new(
        format!("{parent}.{field}"),
        format!("Field validation for '{field}' failed on the 'required' tag"),
    )
}

/// Builds a `gt` tag failure for an empty collection.
fn greater_than(parent: &str, field: &str) -> ValidationFailure {
    ValidationFailure::new(
        format!("{parent}.{field}"),
        format!("Field validation for '{field}' failed on the 'gt' tag"),
    )
}
