// model-pusher-core/src/core/artifact.rs
// ============================================================================
// Module: Publication Request and Record
// Description: Input and output values of the model publication stage.
// Purpose: Carry resolved storage coordinates through one publish attempt.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`PublishRequest`] bundles the local artifact path with the resolved
//! destination coordinates (bucket and key). A [`PublicationRecord`] is the
//! durable answer handed to downstream consumers; it is only ever built
//! after the store has confirmed the transfer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Publish Request
// ============================================================================

/// One publication attempt: a local artifact plus its remote destination.
///
/// # Invariants
/// - `source_path` must reference a complete, readable artifact at call
///   time; the upstream evaluation stage owns that guarantee.
/// - `bucket` and `destination_key` are opaque, non-empty strings resolved
///   from configuration before the stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Filesystem path to the serialized model artifact.
    pub source_path: PathBuf,
    /// Target storage namespace.
    pub bucket: String,
    /// Fully-qualified object key within the bucket.
    pub destination_key: String,
    /// Remove the local artifact after the remote write is confirmed.
    #[serde(default)]
    pub delete_source: bool,
}

impl PublishRequest {
    /// Creates a request that keeps the local artifact after upload.
    #[must_use]
    pub fn new(source_path: &Path, bucket: &str, destination_key: &str) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            bucket: bucket.to_string(),
            destination_key: destination_key.to_string(),
            delete_source: false,
        }
    }

    /// Returns the request with the local-copy disposition replaced.
    #[must_use]
    pub fn with_delete_source(mut self, delete_source: bool) -> Self {
        self.delete_source = delete_source;
        self
    }
}

// ============================================================================
// SECTION: Publication Record
// ============================================================================

/// Location of a published model, as seen by downstream consumers.
///
/// # Invariants
/// - Constructed only after the store reports a successful transfer; never
///   speculatively.
/// - Coordinates are copied from the request, not read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Storage namespace holding the published model.
    pub bucket: String,
    /// Object key under which the model was stored.
    pub destination_key: String,
}
