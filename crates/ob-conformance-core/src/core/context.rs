// crates/ob-conformance-core/src/core/context.rs
// ============================================================================
// Module: Run Context Store
// Description: Shared key/value scratch space for a single test run.
// Purpose: Hold secrets and scenario variables with typed, fallible access.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`Context`] is created once per run and shared between the execution
//! controller and the redirect validator. Clones share the same map, and a
//! read/write lock serializes concurrent writers while readers observe a
//! consistent snapshot.
//!
//! Typed accessors fail with [`ContextError`] instead of panicking when a
//! value has the wrong shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Context access errors.
///
/// # Invariants
/// - Cast messages are stable; callers surface them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// Key is not present.
    #[error("context key not found: {0}")]
    NotFound(String),
    /// Value is not an array.
    #[error("cast error can't get string slice from context")]
    Cast,
    /// Array contains a non-string element.
    #[error("element cast error can't get string slice from context")]
    ElementCast,
    /// Value is not a string.
    #[error("context value for {0} is not a string")]
    NotString(String),
    /// Lock was poisoned by a panicking writer.
    #[error("context lock poisoned")]
    Poisoned,
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Shared run context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Values keyed by variable name.
    values: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, replacing any previous value for the key.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Poisoned`] when the lock is poisoned.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), ContextError> {
        let mut guard = self.values.write().map_err(|_| ContextError::Poisoned)?;
        guard.insert(key.into(), value.into());
        drop(guard);
        Ok(())
    }

    /// Returns a copy of the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::NotFound`] when the key is absent.
    pub fn get(&self, key: &str) -> Result<Value, ContextError> {
        let guard = self.values.read().map_err(|_| ContextError::Poisoned)?;
        guard.get(key).cloned().ok_or_else(|| ContextError::NotFound(key.to_string()))
    }

    /// Returns the string stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] when the key is absent or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ContextError> {
        match self.get(key)? {
            Value::String(value) => Ok(value),
            _ => Err(ContextError::NotString(key.to_string())),
        }
    }

    /// Returns the string array stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Cast`] when the value is not an array and
    /// [`ContextError::ElementCast`] when any element is not a string.
    pub fn get_string_slice(&self, key: &str) -> Result<Vec<String>, ContextError> {
        let Value::Array(items) = self.get(key)? else {
            return Err(ContextError::Cast);
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::String(value) => Ok(value),
                _ => Err(ContextError::ElementCast),
            })
            .collect()
    }

    /// Stores a string array under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Poisoned`] when the lock is poisoned.
    pub fn put_string_slice(&self, key: impl Into<String>, values: &[String]) -> Result<(), ContextError> {
        let array = values.iter().cloned().map(Value::String).collect::<Vec<_>>();
        self.put(key, Value::Array(array))
    }

    /// Stores every pair, replacing existing keys.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Poisoned`] when the lock is poisoned.
    pub fn extend<I, K, V>(&self, entries: I) -> Result<(), ContextError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut guard = self.values.write().map_err(|_| ContextError::Poisoned)?;
        for (key, value) in entries {
            guard.insert(key.into(), value.into());
        }
        drop(guard);
        Ok(())
    }

    /// Returns a point-in-time copy of every entry.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Poisoned`] when the lock is poisoned.
    pub fn snapshot(&self) -> Result<BTreeMap<String, Value>, ContextError> {
        let guard = self.values.read().map_err(|_| ContextError::Poisoned)?;
        Ok(guard.clone())
    }

    /// Returns the number of entries.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Poisoned`] when the lock is poisoned.
    pub fn len(&self) -> Result<usize, ContextError> {
        let guard = self.values.read().map_err(|_| ContextError::Poisoned)?;
        Ok(guard.len())
    }

    /// Returns true when the context holds no entries.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Poisoned`] when the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, ContextError> {
        Ok(self.len()? == 0)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
