// crates/ob-conformance-server/src/config.rs
// ============================================================================
// Module: Conformance Configuration
// Description: TOML configuration for the conformance server and executor.
// Purpose: Load fail-closed settings with hard size and path limits.
// Dependencies: ob-conformance-schema, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is read from a TOML file resolved from an explicit path, the
//! `OB_CONFORMANCE_CONFIG` environment variable, or `ob-conformance.toml` in
//! the working directory. Every section is optional and falls back to
//! defaults, but any value that is present is validated and rejected when
//! out of range.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use ob_conformance_schema::DEFAULT_SPEC_DIRS;
use ob_conformance_schema::SchemaRegistry;
use serde::Deserialize;
use thiserror::Error;

use crate::audit::FileRedirectAuditSink;
use crate::audit::NoopRedirectAuditSink;
use crate::audit::RedirectAuditSink;
use crate::audit::StderrRedirectAuditSink;
use crate::executor::HttpExecutorConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "ob-conformance.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "OB_CONFORMANCE_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Smallest accepted request timeout.
const MIN_TIMEOUT_MS: u64 = 100;
/// Largest accepted request timeout.
const MAX_TIMEOUT_MS: u64 = 300_000;
/// Largest accepted spec directory list.
const MAX_SPEC_DIRS: usize = 16;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Top-level conformance configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConformanceConfig {
    /// Inbound HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Spec document lookup settings.
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Outbound executor settings.
    #[serde(default)]
    pub http: HttpExecutorConfig,
    /// Redirect audit settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl ConformanceConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.schema.validate()?;
        validate_http(&self.http)?;
        self.audit.validate()
    }

    /// Builds the redirect audit sink selected by `[audit]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn RedirectAuditSink>, ConfigError> {
        let sink: Arc<dyn RedirectAuditSink> = match self.audit.sink {
            AuditSinkKind::Stderr => Arc::new(StderrRedirectAuditSink),
            AuditSinkKind::None => Arc::new(NoopRedirectAuditSink),
            AuditSinkKind::File => {
                let path = self
                    .audit
                    .path
                    .as_deref()
                    .ok_or_else(|| ConfigError::Invalid("audit.path required for file sink".to_string()))?;
                let sink = FileRedirectAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Arc::new(sink)
            }
        };
        Ok(sink)
    }

    /// Builds a schema registry over the configured spec directories.
    #[must_use]
    pub fn schema_registry(&self) -> SchemaRegistry {
        SchemaRegistry::new(self.schema.spec_dirs.iter().map(PathBuf::from).collect())
    }
}

/// Inbound HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the redirect and discovery endpoints bind to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.trim().parse().map_err(|_| ConfigError::Invalid("server.bind is not a socket address".to_string()))
    }

    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_body_bytes must be greater than zero".to_string()));
        }
        self.bind_addr().map(|_| ())
    }
}

/// Spec document lookup settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Candidate directories, tried in order.
    #[serde(default = "default_spec_dirs")]
    pub spec_dirs: Vec<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            spec_dirs: default_spec_dirs(),
        }
    }
}

impl SchemaConfig {
    /// Validates spec directory entries.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.spec_dirs.is_empty() {
            return Err(ConfigError::Invalid("schema.spec_dirs must be non-empty".to_string()));
        }
        if self.spec_dirs.len() > MAX_SPEC_DIRS {
            return Err(ConfigError::Invalid("schema.spec_dirs has too many entries".to_string()));
        }
        for dir in &self.spec_dirs {
            validate_path_string("schema.spec_dirs", dir)?;
        }
        Ok(())
    }
}

/// Redirect audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines to stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
    /// Discard events.
    None,
}

/// Redirect audit settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates the sink and path pairing.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path required for file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => Err(ConfigError::Invalid("audit.path only applies to the file sink".to_string())),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates outbound executor settings.
fn validate_http(http: &HttpExecutorConfig) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&http.timeout_ms) {
        return Err(ConfigError::Invalid(format!(
            "http.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
        )));
    }
    if http.max_response_bytes == 0 {
        return Err(ConfigError::Invalid("http.max_response_bytes must be greater than zero".to_string()));
    }
    if http.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid("http.user_agent must be non-empty".to_string()));
    }
    Ok(())
}

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length limits.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    "127.0.0.1:8443".to_string()
}

/// Default maximum request body size in bytes.
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default spec directory candidates.
fn default_spec_dirs() -> Vec<String> {
    DEFAULT_SPEC_DIRS.iter().map(ToString::to_string).collect()
}
