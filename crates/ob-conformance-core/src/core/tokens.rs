// crates/ob-conformance-core/src/core/tokens.rs
// ============================================================================
// Module: Consent Token Collection
// Description: Tracks authorization codes granted per consent token set.
// Purpose: Tell whether every consent a run needs has been granted.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Runs that read protected resources first need the operator to grant one
//! consent per token set, each completed through a browser redirect. A
//! [`TokenCollector`] is told which sets a run needs, receives codes from the
//! redirect validator as consents complete, and answers whether the run can
//! start. Clones share the same state.
//!
//! A set is collected once it holds a code. Collecting a set again replaces
//! its code, so a re-granted consent supersedes the earlier one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Token collection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token set was never registered.
    #[error("unknown token set: {0}")]
    UnknownSet(String),
    /// Lock was poisoned by a panicking writer.
    #[error("token collector lock poisoned")]
    Poisoned,
}

// ============================================================================
// SECTION: Collector
// ============================================================================

/// Shared consent token collector.
#[derive(Debug, Clone, Default)]
pub struct TokenCollector {
    /// Collected code per registered set name; `None` while pending.
    sets: Arc<RwLock<BTreeMap<String, Option<String>>>>,
}

impl TokenCollector {
    /// Creates a collector with no registered sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collector expecting one token for each named set.
    #[must_use]
    pub fn with_sets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sets = names.into_iter().map(|name| (name.into(), None)).collect();
        Self {
            sets: Arc::new(RwLock::new(sets)),
        }
    }

    /// Registers a set as pending. Already registered sets are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Poisoned`] when the lock is poisoned.
    pub fn register(&self, name: impl Into<String>) -> Result<(), TokenError> {
        let mut guard = self.sets.write().map_err(|_| TokenError::Poisoned)?;
        guard.entry(name.into()).or_insert(None);
        drop(guard);
        Ok(())
    }

    /// Records the token granted for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnknownSet`] when `name` was never registered.
    pub fn collect(&self, name: &str, token: impl Into<String>) -> Result<(), TokenError> {
        let mut guard = self.sets.write().map_err(|_| TokenError::Poisoned)?;
        let slot = guard.get_mut(name).ok_or_else(|| TokenError::UnknownSet(name.to_string()))?;
        *slot = Some(token.into());
        drop(guard);
        Ok(())
    }

    /// Returns the token collected for `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnknownSet`] when `name` was never registered.
    pub fn token(&self, name: &str) -> Result<Option<String>, TokenError> {
        let guard = self.sets.read().map_err(|_| TokenError::Poisoned)?;
        guard.get(name).cloned().ok_or_else(|| TokenError::UnknownSet(name.to_string()))
    }

    /// Returns the registered sets still waiting for a token, in name order.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Poisoned`] when the lock is poisoned.
    pub fn pending(&self) -> Result<Vec<String>, TokenError> {
        let guard = self.sets.read().map_err(|_| TokenError::Poisoned)?;
        Ok(guard.iter().filter(|(_, token)| token.is_none()).map(|(name, _)| name.clone()).collect())
    }

    /// Returns true when every registered set holds a token.
    ///
    /// A collector with no registered sets is trivially complete.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Poisoned`] when the lock is poisoned.
    pub fn all_collected(&self) -> Result<bool, TokenError> {
        Ok(self.pending()?.is_empty())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
