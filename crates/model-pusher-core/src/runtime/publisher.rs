// model-pusher-core/src/runtime/publisher.rs
// ============================================================================
// Module: Model Publisher
// Description: Orchestrates one publication attempt against a model store.
// Purpose: Validate inputs, delegate the transfer, and classify failures.
// Dependencies: crate::{audit, core, interfaces}
// ============================================================================

//! ## Overview
//! The publisher owns the decision of when to call the store and how to
//! interpret its outcome. Every lower-level failure is caught exactly once
//! at this boundary and re-raised as a classified [`PublishError`]; no
//! partial [`PublicationRecord`] is ever returned. The publisher performs
//! no retries: each invocation is at most one attempt, and re-invoking
//! after a failure is safe because the store's put overwrites.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::audit::NoopAuditSink;
use crate::audit::PublishAuditEvent;
use crate::audit::PublishAuditSink;
use crate::audit::PublishOutcome;
use crate::audit::now_ms;
use crate::core::PublicationRecord;
use crate::core::PublishRequest;
use crate::interfaces::ModelStore;
use crate::interfaces::SourceDisposition;
use crate::interfaces::TransferError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Audit event emitted when a publication attempt begins.
const EVENT_PUBLISH_STARTED: &str = "publish_started";
/// Audit event emitted immediately before the store put.
const EVENT_UPLOAD_STARTED: &str = "upload_started";
/// Audit event emitted after the store confirms the put.
const EVENT_UPLOAD_COMPLETED: &str = "upload_completed";
/// Audit event emitted when a requested source cleanup did not complete.
const EVENT_SOURCE_CLEANUP_FAILED: &str = "source_cleanup_failed";
/// Audit event emitted when the attempt finishes successfully.
const EVENT_PUBLISH_COMPLETED: &str = "publish_completed";
/// Audit event emitted when the attempt finishes with an error.
const EVENT_PUBLISH_FAILED: &str = "publish_failed";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Classified publication errors surfaced to the pipeline.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Request coordinates are unusable; raised before any store call.
    #[error("invalid publish request: {reason}")]
    InvalidRequest {
        /// Reason the request was rejected.
        reason: String,
    },
    /// Local source artifact is missing, empty, or unreadable; raised
    /// before any store call.
    #[error("invalid model artifact {path}: {reason}")]
    InvalidArtifact {
        /// Local artifact path as supplied by the caller.
        path: String,
        /// Reason the artifact was rejected.
        reason: String,
    },
    /// The store reported a transfer failure; the cause is preserved.
    #[error("model publication to {bucket}/{key} failed")]
    Transfer {
        /// Storage namespace targeted by the attempt.
        bucket: String,
        /// Destination object key targeted by the attempt.
        key: String,
        /// Underlying store failure.
        #[source]
        source: TransferError,
    },
}

impl PublishError {
    /// Returns a stable label for the failure kind.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::InvalidRequest {
                ..
            } => "invalid_request",
            Self::InvalidArtifact {
                ..
            } => "invalid_artifact",
            Self::Transfer {
                ..
            } => "transfer",
        }
    }
}

// ============================================================================
// SECTION: Publisher
// ============================================================================

/// Orchestrator for one model publication attempt.
pub struct ModelPublisher {
    /// Remote store capability used for the transfer.
    store: Arc<dyn ModelStore>,
    /// Injected sink receiving lifecycle audit events.
    audit: Arc<dyn PublishAuditSink>,
}

impl ModelPublisher {
    /// Creates a publisher that discards audit events.
    #[must_use]
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self::with_audit(store, Arc::new(NoopAuditSink))
    }

    /// Creates a publisher with an explicit audit sink.
    #[must_use]
    pub fn with_audit(store: Arc<dyn ModelStore>, audit: Arc<dyn PublishAuditSink>) -> Self {
        Self {
            store,
            audit,
        }
    }

    /// Publishes the requested artifact and returns its new location.
    ///
    /// The record's coordinates are copied from the request, never read
    /// back from the store response.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the request or artifact is invalid or
    /// when the store rejects the transfer. No record is produced on
    /// failure.
    pub fn publish(&self, request: &PublishRequest) -> Result<PublicationRecord, PublishError> {
        self.emit(EVENT_PUBLISH_STARTED, request, PublishOutcome::Ok, None, None);
        let outcome = self.run(request);
        match &outcome {
            Ok(_) => {
                self.emit(EVENT_PUBLISH_COMPLETED, request, PublishOutcome::Ok, None, None);
            }
            Err(err) => {
                self.emit(
                    EVENT_PUBLISH_FAILED,
                    request,
                    PublishOutcome::Error,
                    Some(err.kind_label()),
                    Some(err.to_string()),
                );
            }
        }
        outcome
    }

    /// Runs the validated publish flow for one request.
    fn run(&self, request: &PublishRequest) -> Result<PublicationRecord, PublishError> {
        validate_request(request)?;
        validate_artifact(&request.source_path)?;
        self.emit(EVENT_UPLOAD_STARTED, request, PublishOutcome::Ok, None, None);
        let disposition = self
            .store
            .put(&request.source_path, &request.destination_key, request.delete_source)
            .map_err(|source| PublishError::Transfer {
                bucket: request.bucket.clone(),
                key: request.destination_key.clone(),
                source,
            })?;
        self.emit(EVENT_UPLOAD_COMPLETED, request, PublishOutcome::Ok, None, None);
        if let SourceDisposition::RemovalFailed {
            reason,
        } = disposition
        {
            self.emit(
                EVENT_SOURCE_CLEANUP_FAILED,
                request,
                PublishOutcome::Error,
                None,
                Some(reason),
            );
        }
        Ok(PublicationRecord {
            bucket: request.bucket.clone(),
            destination_key: request.destination_key.clone(),
        })
    }

    /// Emits one lifecycle audit event for the request.
    fn emit(
        &self,
        event: &'static str,
        request: &PublishRequest,
        outcome: PublishOutcome,
        error_kind: Option<&'static str>,
        message: Option<String>,
    ) {
        self.audit.record(&PublishAuditEvent {
            event,
            timestamp_ms: now_ms(),
            bucket: request.bucket.clone(),
            key: request.destination_key.clone(),
            source_path: request.source_path.display().to_string(),
            outcome,
            error_kind,
            message,
        });
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Validates request coordinates before any store interaction.
fn validate_request(request: &PublishRequest) -> Result<(), PublishError> {
    if request.bucket.trim().is_empty() {
        return Err(PublishError::InvalidRequest {
            reason: "bucket must be set".to_string(),
        });
    }
    if request.destination_key.trim().is_empty() {
        return Err(PublishError::InvalidRequest {
            reason: "destination key must be set".to_string(),
        });
    }
    Ok(())
}

/// Validates the local artifact precondition before any store interaction.
fn validate_artifact(path: &Path) -> Result<(), PublishError> {
    let display = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|err| PublishError::InvalidArtifact {
        path: display.clone(),
        reason: format!("artifact is not accessible: {err}"),
    })?;
    if !metadata.is_file() {
        return Err(PublishError::InvalidArtifact {
            path: display,
            reason: "artifact is not a regular file".to_string(),
        });
    }
    if metadata.len() == 0 {
        return Err(PublishError::InvalidArtifact {
            path: display,
            reason: "artifact is empty".to_string(),
        });
    }
    File::open(path).map_err(|err| PublishError::InvalidArtifact {
        path: display,
        reason: format!("artifact is not readable: {err}"),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests;
