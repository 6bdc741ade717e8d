// crates/ob-conformance-schema/src/document.rs
// ============================================================================
// Module: Swagger Documents
// Description: Bounded loading of Swagger 2.0 documents in JSON or YAML.
// Purpose: Turn spec files on disk into parsed documents with typed headers.
// Dependencies: serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! Spec files are read with a hard size limit, parsed as YAML when the
//! extension says so and as JSON otherwise, and exposed through a thin view
//! over the raw [`Value`] tree. Response `$ref`s into `#/responses` are
//! resolved here so downstream code only sees inline response objects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::SchemaError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a single spec file.
pub const MAX_SPEC_BYTES: usize = 16 * 1024 * 1024;

/// HTTP methods a Swagger path item may declare.
pub(crate) const OPERATION_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

// ============================================================================
// SECTION: Document
// ============================================================================

/// Parsed Swagger document.
#[derive(Debug, Clone, PartialEq)]
pub struct SwaggerDocument {
    /// Raw document tree.
    root: Value,
}

impl SwaggerDocument {
    /// Wraps an already parsed document tree.
    #[must_use]
    pub const fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Loads and parses a spec file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] when the file cannot be read or is too large
    /// and [`SchemaError::Parse`] when it is not valid JSON or YAML.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = read_file_limited(path, MAX_SPEC_BYTES)?;
        let root = parse_document(path, &content)?;
        Ok(Self { root })
    }

    /// Returns the raw document tree.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// Returns the `swagger` version string, empty when absent.
    #[must_use]
    pub fn swagger(&self) -> &str {
        self.root.get("swagger").and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns `info.title`, empty when absent.
    #[must_use]
    pub fn title(&self) -> &str {
        self.root.pointer("/info/title").and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns `info.version`, empty when absent.
    #[must_use]
    pub fn version(&self) -> &str {
        self.root.pointer("/info/version").and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns `basePath` without a trailing slash.
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.root.get("basePath").and_then(Value::as_str).unwrap_or_default().trim_end_matches('/')
    }

    /// Returns the document-level `produces` list.
    #[must_use]
    pub fn produces(&self) -> Vec<String> {
        string_list(self.root.get("produces"))
    }

    /// Returns the `definitions` object, or an empty object.
    #[must_use]
    pub fn definitions(&self) -> Value {
        self.root.get("definitions").cloned().unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    /// Iterates `(method, path template, operation)` triples in document order.
    ///
    /// Methods are returned upper-case.
    pub fn operations(&self) -> impl Iterator<Item = (String, &str, &Value)> {
        self.root
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|paths| paths.iter())
            .flat_map(|(template, item)| {
                OPERATION_METHODS.iter().filter_map(move |method| {
                    item.get(*method).map(|operation| (method.to_ascii_uppercase(), template.as_str(), operation))
                })
            })
    }

    /// Resolves a response object, following one `#/responses/<name>` reference.
    #[must_use]
    pub fn resolve_response<'a>(&'a self, response: &'a Value) -> Option<&'a Value> {
        match response.get("$ref").and_then(Value::as_str) {
            Some(reference) => {
                let name = reference.strip_prefix("#/responses/")?;
                self.root.get("responses")?.get(name)
            }
            None => Some(response),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a string array, ignoring non-string entries.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Returns true when the path carries a spec file extension.
pub(crate) fn is_spec_file(path: &Path) -> bool {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default().to_ascii_lowercase();
    matches!(ext.as_str(), "json" | "yaml" | "yml")
}

/// Reads a file with a hard byte limit.
fn read_file_limited(path: &Path, max_bytes: usize) -> Result<Vec<u8>, SchemaError> {
    let file = File::open(path)
        .map_err(|err| SchemaError::Io(format!("opening spec file failed, filename={}: {err}", path.display())))?;
    let limit = u64::try_from(max_bytes.saturating_add(1))
        .map_err(|_| SchemaError::Io("spec size limit exceeds u64".to_string()))?;
    let mut buf = Vec::new();
    file.take(limit)
        .read_to_end(&mut buf)
        .map_err(|err| SchemaError::Io(format!("reading spec file failed, filename={}: {err}", path.display())))?;
    if buf.len() > max_bytes {
        return Err(SchemaError::Io(format!("spec file exceeds size limit, filename={}", path.display())));
    }
    Ok(buf)
}

/// Parses JSON or YAML content, selected by file extension.
fn parse_document(path: &Path, content: &[u8]) -> Result<Value, SchemaError> {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default().to_ascii_lowercase();
    let parsed = if ext == "yaml" || ext == "yml" {
        serde_yaml::from_slice::<Value>(content).map_err(|err| err.to_string())
    } else {
        serde_json::from_slice::<Value>(content).map_err(|err| err.to_string())
    };
    parsed.map_err(|message| SchemaError::Parse {
        file: path.display().to_string(),
        message,
    })
}
