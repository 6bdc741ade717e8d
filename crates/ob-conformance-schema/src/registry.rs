// crates/ob-conformance-schema/src/registry.rs
// ============================================================================
// Module: Swagger Validators
// Description: Response validator per Swagger document and a keyed cache.
// Purpose: Build validators by spec name and version and reuse them per run.
// Dependencies: ob-conformance-core
// ============================================================================

//! ## Overview
//! [`SwaggerValidator`] runs the content-type, status-code, and body checks
//! for the operation matched by a response. [`SchemaRegistry`] locates the
//! spec file whose `info.title` and `info.version` match a request, builds
//! the validator once, and caches it per (name, version).
//!
//! Only Swagger 2.0 documents with `info.version` of `v3.0.0` or `v3.1.0`
//! are accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use ob_conformance_core::ApiSpecification;
use ob_conformance_core::HttpResponse;
use ob_conformance_core::ResolveError;
use ob_conformance_core::ResponseValidator;
use ob_conformance_core::SchemaFailure;
use ob_conformance_core::SchemaValidationError;
use ob_conformance_core::ValidatorResolver;

use crate::document::SwaggerDocument;
use crate::document::is_spec_file;
use crate::error::SchemaError;
use crate::finder::Finder;
use crate::validators::BodyCheck;
use crate::validators::ContentTypeCheck;
use crate::validators::ResponseCheck;
use crate::validators::StatusCodeCheck;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Swagger version accepted by the validator.
pub const SUPPORTED_SWAGGER_VERSION: &str = "2.0";

/// Document `info.version` values accepted by the validator.
pub const SUPPORTED_SPEC_VERSIONS: [&str; 2] = ["v3.0.0", "v3.1.0"];

/// Candidate spec directories, tried in order.
pub const DEFAULT_SPEC_DIRS: [&str; 2] = ["pkg/schema/spec/v3.1.0", "../../pkg/schema/spec/v3.1.0"];

// ============================================================================
// SECTION: Swagger Validator
// ============================================================================

/// Response validator backed by one Swagger 2.0 document.
pub struct SwaggerValidator {
    /// Indexed operations.
    finder: Finder,
    /// Checks run in order; failures are concatenated.
    checks: [Box<dyn ResponseCheck>; 3],
}

impl SwaggerValidator {
    /// Builds a validator from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedSwaggerVersion`] or
    /// [`SchemaError::UnsupportedSpecVersion`] for documents outside the
    /// supported set, and [`SchemaError::Operation`] when a response schema
    /// cannot be compiled.
    pub fn new(document: &SwaggerDocument) -> Result<Self, SchemaError> {
        if document.swagger() != SUPPORTED_SWAGGER_VERSION {
            return Err(SchemaError::UnsupportedSwaggerVersion);
        }
        if !SUPPORTED_SPEC_VERSIONS.contains(&document.version()) {
            return Err(SchemaError::UnsupportedSpecVersion);
        }
        Ok(Self {
            finder: Finder::new(document)?,
            checks: [Box::new(ContentTypeCheck), Box::new(StatusCodeCheck), Box::new(BodyCheck)],
        })
    }

    /// Loads a spec file and builds a validator from it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the file cannot be loaded or is unsupported.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        Self::new(&SwaggerDocument::load(path)?)
    }

    /// Locates the spec file for `name` and `version` and builds a validator.
    ///
    /// The first readable directory in `dirs` is searched; files without a
    /// JSON or YAML extension are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] when no directory can be read,
    /// [`SchemaError::Parse`] when a candidate file is malformed, and
    /// [`SchemaError::NotFound`] when no document matches.
    pub fn for_spec(dirs: &[PathBuf], name: &str, version: &str) -> Result<Self, SchemaError> {
        let dir = first_readable_dir(dirs)?;
        let mut files = fs::read_dir(&dir)
            .map_err(|err| SchemaError::Io(format!("opening spec folder failed, dirname={}: {err}", dir.display())))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_spec_file(path))
            .collect::<Vec<_>>();
        files.sort();
        for file in files {
            let document = SwaggerDocument::load(&file)?;
            if document.version() == version && document.title() == name {
                return Self::new(&document);
            }
        }
        Err(SchemaError::NotFound {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl ResponseValidator for SwaggerValidator {
    fn validate(&self, response: &HttpResponse) -> Result<Vec<SchemaFailure>, SchemaValidationError> {
        let Some(operation) = self.finder.find(&response.method, &response.path) else {
            return Ok(vec![SchemaFailure::new(format!(
                "no operation found for {} {}",
                response.method, response.path
            ))]);
        };
        Ok(self.checks.iter().flat_map(|check| check.check(operation, response)).collect())
    }
}

/// Returns the first directory that can be listed.
fn first_readable_dir(dirs: &[PathBuf]) -> Result<PathBuf, SchemaError> {
    let mut last_error = SchemaError::Io("no spec folders configured".to_string());
    for dir in dirs {
        match fs::read_dir(dir) {
            Ok(_) => return Ok(dir.clone()),
            Err(err) => {
                let wd = std::env::current_dir().map(|wd| wd.display().to_string()).unwrap_or_default();
                last_error = SchemaError::Io(format!("opening spec folder failed, dirname={dir:?}, wd={wd:?}: {err}"));
            }
        }
    }
    Err(last_error)
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Cache key: spec name and normalized document version.
type CacheKey = (String, String);

/// Validator cache keyed by (spec name, version).
pub struct SchemaRegistry {
    /// Candidate spec directories.
    dirs: Vec<PathBuf>,
    /// Built validators.
    cache: Mutex<BTreeMap<CacheKey, Arc<SwaggerValidator>>>,
}

impl SchemaRegistry {
    /// Creates a registry searching `dirs` in order.
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the validator for `name` and `version`, building it on first use.
    ///
    /// Discovery versions such as `v3.1` are normalized to `v3.1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the validator cannot be built, or
    /// [`SchemaError::Io`] when the cache lock is poisoned.
    pub fn validator(&self, name: &str, version: &str) -> Result<Arc<SwaggerValidator>, SchemaError> {
        let key = (name.to_string(), normalize_version(version));
        if let Some(validator) = self.lock_cache()?.get(&key) {
            return Ok(Arc::clone(validator));
        }
        // Build without holding the lock; a racing build of the same key loses.
        let built = Arc::new(SwaggerValidator::for_spec(&self.dirs, &key.0, &key.1)?);
        let mut cache = self.lock_cache()?;
        Ok(Arc::clone(cache.entry(key).or_insert(built)))
    }

    /// Locks the cache, mapping poisoning to [`SchemaError::Io`].
    fn lock_cache(&self) -> Result<MutexGuard<'_, BTreeMap<CacheKey, Arc<SwaggerValidator>>>, SchemaError> {
        self.cache.lock().map_err(|_| SchemaError::Io("schema cache mutex poisoned".to_string()))
    }

    /// Number of cached validators.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or_default()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SPEC_DIRS.iter().map(PathBuf::from).collect())
    }
}

impl ValidatorResolver for SchemaRegistry {
    fn resolve(&self, specification: &ApiSpecification) -> Result<Arc<dyn ResponseValidator>, ResolveError> {
        let validator: Arc<dyn ResponseValidator> = self
            .validator(&specification.name, &specification.version)
            .map_err(|err| ResolveError(err.to_string()))?;
        Ok(validator)
    }
}

/// Expands two-component versions (`v3.1`) to three (`v3.1.0`).
fn normalize_version(version: &str) -> String {
    if version.split('.').count() == 2 { format!("{version}.0") } else { version.to_string() }
}
