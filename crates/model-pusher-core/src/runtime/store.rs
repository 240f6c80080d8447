// model-pusher-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Model Store
// Description: Simple in-memory model store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of [`ModelStore`]
//! for tests and local demos. It is not intended for production use. The
//! store supports deterministic failure injection so retry behavior can be
//! exercised without a flaky backend: an injected failure happens before
//! any state change, leaving both the remote map and the local artifact
//! untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::interfaces::ModelStore;
use crate::interfaces::SourceDisposition;
use crate::interfaces::TransferError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory model store for tests and examples.
#[derive(Debug, Default)]
pub struct InMemoryModelStore {
    /// Object map protected by a mutex.
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    /// Number of put invocations observed.
    put_count: Mutex<usize>,
    /// Remaining injected put failures.
    failures: Mutex<usize>,
}

impl InMemoryModelStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arranges for the next `count` puts to fail with a backend error.
    pub fn fail_puts(&self, count: usize) {
        if let Ok(mut failures) = self.failures.lock() {
            *failures = count;
        }
    }

    /// Returns how many times put has been invoked.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.put_count.lock().map(|count| *count).unwrap_or(0)
    }

    /// Returns the stored bytes for a key, if present.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok().and_then(|objects| objects.get(key).cloned())
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }
}

impl ModelStore for InMemoryModelStore {
    fn put(
        &self,
        source_path: &Path,
        destination_key: &str,
        delete_source: bool,
    ) -> Result<SourceDisposition, TransferError> {
        if destination_key.trim().is_empty() {
            return Err(TransferError::Invalid("destination key must be set".to_string()));
        }
        {
            let mut count = self
                .put_count
                .lock()
                .map_err(|_| TransferError::Io("model store lock poisoned".to_string()))?;
            *count = count.saturating_add(1);
        }
        {
            let mut failures = self
                .failures
                .lock()
                .map_err(|_| TransferError::Io("model store lock poisoned".to_string()))?;
            if *failures > 0 {
                *failures -= 1;
                return Err(TransferError::Backend("injected transfer failure".to_string()));
            }
        }
        let bytes = fs::read(source_path)
            .map_err(|err| TransferError::Io(format!("local artifact read failed: {err}")))?;
        self.objects
            .lock()
            .map_err(|_| TransferError::Io("model store lock poisoned".to_string()))?
            .insert(destination_key.to_string(), bytes);
        if delete_source {
            return Ok(match fs::remove_file(source_path) {
                Ok(()) => SourceDisposition::Removed,
                Err(err) => SourceDisposition::RemovalFailed {
                    reason: err.to_string(),
                },
            });
        }
        Ok(SourceDisposition::Retained)
    }
}
