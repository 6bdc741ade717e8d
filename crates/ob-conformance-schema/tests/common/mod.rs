// crates/ob-conformance-schema/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Swagger documents written to temporary spec directories.
// Purpose: Share realistic Account and Transaction fixtures across tests.
// Dependencies: serde_json, tempfile
// ============================================================================

//! ## Overview
//! Provides a compact Account and Transaction Swagger document and helpers
//! that write it, or variants of it, into a temporary spec directory.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Title used by the account fixture.
pub const ACCOUNT_TITLE: &str = "Account and Transaction API Specification";

/// Account and Transaction document with the given `info.version`.
pub fn account_document(version: &str) -> Value {
    json!({
        "swagger": "2.0",
        "info": {"title": ACCOUNT_TITLE, "version": version},
        "basePath": "/open-banking/v3.1/aisp",
        "produces": ["application/json; charset=utf-8"],
        "paths": {
            "/accounts": {
                "get": {
                    "responses": {
                        "200": {"$ref": "#/responses/200AccountsRead"},
                        "400": {"description": "Bad request"},
                        "default": {"description": "Error", "schema": {"$ref": "#/definitions/OBErrorResponse1"}}
                    }
                }
            },
            "/accounts/{AccountId}/statements/{StatementId}/file": {
                "get": {
                    "produces": ["application/pdf"],
                    "responses": {"200": {"description": "Statement file", "schema": {"type": "file"}}}
                }
            },
            "/account-access-consents/{ConsentId}": {
                "delete": {"responses": {"204": {"description": "No content"}}}
            }
        },
        "responses": {
            "200AccountsRead": {
                "description": "Accounts read",
                "schema": {"$ref": "#/definitions/OBReadAccount3"}
            }
        },
        "definitions": {
            "OBReadAccount3": {
                "type": "object",
                "required": ["Data"],
                "properties": {
                    "Data": {
                        "type": "object",
                        "required": ["Account"],
                        "properties": {
                            "Account": {"type": "array", "items": {"$ref": "#/definitions/OBAccount3"}}
                        }
                    }
                }
            },
            "OBAccount3": {
                "type": "object",
                "required": ["AccountId", "Currency"],
                "properties": {
                    "AccountId": {"type": "string", "minLength": 1, "maxLength": 40},
                    "Currency": {"type": "string", "pattern": "^[A-Z]{3,3}$"},
                    "AccountType": {"type": "string", "enum": ["Business", "Personal"]}
                }
            },
            "OBErrorResponse1": {
                "type": "object",
                "required": ["Code", "Message"],
                "properties": {"Code": {"type": "string"}, "Message": {"type": "string"}}
            }
        }
    })
}

/// Valid accounts response body.
pub fn accounts_body() -> String {
    json!({"Data": {"Account": [{"AccountId": "22289", "Currency": "GBP", "AccountType": "Personal"}]}}).to_string()
}

/// Temporary spec directory holding the given files.
pub struct SpecDir {
    /// Owned temporary directory.
    pub dir: TempDir,
}

impl SpecDir {
    /// Creates an empty spec directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Writes a JSON document under `name`.
    pub fn write_json(&self, name: &str, document: &Value) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, serde_json::to_vec_pretty(document).unwrap()).unwrap();
        path
    }

    /// Writes raw text under `name`.
    pub fn write_text(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
