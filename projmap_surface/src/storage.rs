// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key/value storage in the shape of browser local storage.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Storage shared between a store and its sync transport.
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// String key/value storage.
///
/// Implementations use interior mutability; one instance may be shared by
/// several stores to model tabs of the same origin.
pub trait KeyValueStorage: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Missing keys are ignored.
    fn remove(&self, key: &str);
}

/// A write was refused by the storage backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageError {
    /// Key being written.
    pub key: String,
    /// Backend-specific reason.
    pub reason: String,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not write `{}`: {}", self.key, self.reason)
    }
}

impl std::error::Error for StorageError {}

/// In-memory [`KeyValueStorage`] with an optional size quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Creates empty storage without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates empty storage that refuses writes once the summed key and
    /// value lengths would exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::default(),
            quota: Some(bytes),
        }
    }

    /// Wraps `self` for sharing.
    #[must_use]
    pub fn shared(self) -> SharedStorage {
        Arc::new(self)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StorageError {
                    key: key.to_owned(),
                    reason: format!("quota of {quota} bytes exceeded"),
                });
            }
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}
