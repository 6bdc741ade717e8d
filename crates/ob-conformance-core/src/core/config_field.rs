// crates/ob-conformance-core/src/core/config_field.rs
// ============================================================================
// Module: Configuration Field Rules
// Description: Input-rendering rules for operator-supplied configuration.
// Purpose: Describe which configuration fields a discovery model requires.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ConfigField`] names one configuration input and the checks a form
//! should apply to it. `required`, `match`, and `in` are evaluated together:
//! every populated constraint must hold.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Configuration field and its input rule.
///
/// # Invariants
/// - `field_name` is unique within a resolved field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigField {
    /// JSON name of the configuration field.
    #[serde(rename = "field_name")]
    pub field_name: String,
    /// Validation rule applied to the field.
    #[serde(rename = "validation", default)]
    pub rule: Rule,
}

impl ConfigField {
    /// Creates a field that must be rendered on the input form.
    #[must_use]
    pub fn required(field_name: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            rule: Rule {
                required: true,
                ..Rule::default()
            },
        }
    }

    /// Creates a field shown only when every parameter field is set.
    #[must_use]
    pub fn conditional_on(field_name: &str, params: &[&str]) -> Self {
        Self {
            field_name: field_name.to_string(),
            rule: Rule {
                condition: Some(CustomCondition {
                    op: "if".to_string(),
                    params: params.iter().map(ToString::to_string).collect(),
                }),
                ..Rule::default()
            },
        }
    }
}

/// Suggested input checks for a configuration field.
///
/// `required` means the field must be displayed on the form, not that a
/// value must be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Field must be rendered.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Regular expression the value must match.
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    /// Allowed values.
    #[serde(default, rename = "in", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Value>,
    /// Custom condition such as `if`, `lt`, or `gt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<CustomCondition>,
}

/// Custom validation condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCondition {
    /// Condition operator.
    pub op: String,
    /// Names of the fields the condition refers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

/// Serde helper for omitting `false` flags.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde skip_serializing_if passes by reference.")]
const fn is_false(value: &bool) -> bool {
    !*value
}
