// model-pusher-core/src/interfaces/mod.rs
// ============================================================================
// Module: Model Pusher Interfaces
// Description: Backend-agnostic interfaces for remote model storage.
// Purpose: Define the contract surface the publisher depends on.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the publication stage integrates with remote
//! storage without embedding backend-specific details. Implementations must
//! fail closed: a failed put leaves no externally visible partial object,
//! and re-invoking a put after a failure is always safe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Transfer Errors
// ============================================================================

/// Model store transfer errors.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Invalid key, prefix, or store configuration.
    #[error("model store invalid: {0}")]
    Invalid(String),
    /// Local I/O or runtime failure.
    #[error("model store io error: {0}")]
    Io(String),
    /// Remote call rejected (network, authorization, or quota).
    #[error("model store backend error: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Source Disposition
// ============================================================================

/// Fate of the local artifact after a confirmed upload.
///
/// A removal failure is reported here instead of failing the put: the
/// remote copy already exists and is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDisposition {
    /// The local artifact was kept in place.
    Retained,
    /// The local artifact was removed after the upload was confirmed.
    Removed,
    /// Removal was requested but failed; the upload itself succeeded.
    RemovalFailed {
        /// Reason the local artifact could not be removed.
        reason: String,
    },
}

// ============================================================================
// SECTION: Model Store
// ============================================================================

/// Capability abstraction over a remote key/object store.
///
/// Implementations hold only the coordinates needed to address objects, no
/// transfer-in-progress state, and must be safe to call from independent
/// pipeline runs targeting different keys.
pub trait ModelStore: Send + Sync {
    /// Uploads the file at `source_path` to `destination_key`, overwriting
    /// any existing object at that key (last writer wins).
    ///
    /// When `delete_source` is true the local file is removed only after
    /// the remote write is confirmed; the returned disposition reports the
    /// outcome of that cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] when the local file is missing or
    /// unreadable, the remote namespace is unreachable, or the remote call
    /// is rejected.
    fn put(
        &self,
        source_path: &Path,
        destination_key: &str,
        delete_source: bool,
    ) -> Result<SourceDisposition, TransferError>;
}
