// model-pusher-core/src/runtime/publisher/tests.rs
// ============================================================================
// Module: Model Publisher Tests
// Description: Unit tests for the publication flow.
// Purpose: Validate success, classification, retry, and cleanup semantics.
// Dependencies: model-pusher-core, tempfile
// ============================================================================

//! ## Overview
//! Exercises the publisher against the in-memory store and a recording
//! audit sink: success-path record construction, pre-transfer validation,
//! failure classification, retry safety, and delete-on-success handling.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tempfile::TempDir;

use super::*;
use crate::runtime::store::InMemoryModelStore;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Serialized-model stand-in written into artifact fixtures.
const MODEL_BYTES: &[u8] = b"trained-model-bytes";

/// Audit sink that records every event for assertions.
#[derive(Default)]
struct RecordingAuditSink {
    /// Captured events in emission order.
    events: Mutex<Vec<PublishAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns the captured event names in emission order.
    fn names(&self) -> Vec<&'static str> {
        self.events.lock().expect("audit lock").iter().map(|event| event.event).collect()
    }

    /// Returns the last captured event.
    fn last(&self) -> PublishAuditEvent {
        self.events.lock().expect("audit lock").last().expect("at least one event").clone()
    }
}

impl PublishAuditSink for RecordingAuditSink {
    fn record(&self, event: &PublishAuditEvent) {
        self.events.lock().expect("audit lock").push(event.clone());
    }
}

/// Writes a non-empty artifact fixture to a temp file.
fn sample_artifact() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("artifact fixture");
    file.write_all(MODEL_BYTES).expect("artifact bytes");
    file.flush().expect("artifact flush");
    file
}

/// Builds a request targeting the fixture artifact.
fn sample_request(source: &Path) -> PublishRequest {
    PublishRequest::new(source, "models-bucket", "prod/model.pkl")
}

/// Builds a publisher plus shared store and audit handles.
fn publisher_fixture() -> (ModelPublisher, Arc<InMemoryModelStore>, Arc<RecordingAuditSink>) {
    let store = Arc::new(InMemoryModelStore::new());
    let audit = Arc::new(RecordingAuditSink::default());
    let publisher = ModelPublisher::with_audit(store.clone(), audit.clone());
    (publisher, store, audit)
}

// ============================================================================
// SECTION: Success Path
// ============================================================================

#[test]
fn publish_returns_record_with_configured_coordinates() {
    let artifact = sample_artifact();
    let (publisher, store, _audit) = publisher_fixture();

    let record = publisher.publish(&sample_request(artifact.path())).expect("publish");

    assert_eq!(record.bucket, "models-bucket");
    assert_eq!(record.destination_key, "prod/model.pkl");
    assert_eq!(store.put_count(), 1);
    assert_eq!(store.object("prod/model.pkl").as_deref(), Some(MODEL_BYTES));
}

#[test]
fn publish_keeps_local_artifact_by_default() {
    let artifact = sample_artifact();
    let (publisher, _store, _audit) = publisher_fixture();

    publisher.publish(&sample_request(artifact.path())).expect("publish");

    assert!(artifact.path().exists());
}

#[test]
fn audit_events_follow_publish_lifecycle() {
    let artifact = sample_artifact();
    let (publisher, _store, audit) = publisher_fixture();

    publisher.publish(&sample_request(artifact.path())).expect("publish");

    assert_eq!(
        audit.names(),
        vec!["publish_started", "upload_started", "upload_completed", "publish_completed"]
    );
    assert_eq!(audit.last().outcome, PublishOutcome::Ok);
}

// ============================================================================
// SECTION: Pre-Transfer Validation
// ============================================================================

#[test]
fn publish_rejects_missing_artifact_without_store_call() {
    let (publisher, store, audit) = publisher_fixture();
    let request = sample_request(Path::new("/nonexistent/model.pkl"));

    let result = publisher.publish(&request);

    assert!(matches!(result, Err(PublishError::InvalidArtifact { .. })));
    assert_eq!(store.put_count(), 0);
    assert_eq!(audit.last().error_kind, Some("invalid_artifact"));
}

#[test]
fn publish_rejects_empty_artifact() {
    let artifact = NamedTempFile::new().expect("artifact fixture");
    let (publisher, store, _audit) = publisher_fixture();

    let result = publisher.publish(&sample_request(artifact.path()));

    assert!(matches!(result, Err(PublishError::InvalidArtifact { .. })));
    assert_eq!(store.put_count(), 0);
}

#[test]
fn publish_rejects_directory_artifact() {
    let dir = TempDir::new().expect("dir fixture");
    let (publisher, store, _audit) = publisher_fixture();

    let result = publisher.publish(&sample_request(dir.path()));

    assert!(matches!(result, Err(PublishError::InvalidArtifact { .. })));
    assert_eq!(store.put_count(), 0);
}

#[test]
fn publish_rejects_blank_coordinates() {
    let artifact = sample_artifact();
    let (publisher, store, _audit) = publisher_fixture();

    let no_bucket = PublishRequest::new(artifact.path(), "  ", "prod/model.pkl");
    assert!(matches!(publisher.publish(&no_bucket), Err(PublishError::InvalidRequest { .. })));

    let no_key = PublishRequest::new(artifact.path(), "models-bucket", "");
    assert!(matches!(publisher.publish(&no_key), Err(PublishError::InvalidRequest { .. })));

    assert_eq!(store.put_count(), 0);
}

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

#[test]
fn publish_wraps_store_failure_with_context() {
    let artifact = sample_artifact();
    let (publisher, store, audit) = publisher_fixture();
    store.fail_puts(1);

    let result = publisher.publish(&sample_request(artifact.path()));

    match result {
        Err(PublishError::Transfer {
            bucket,
            key,
            source,
        }) => {
            assert_eq!(bucket, "models-bucket");
            assert_eq!(key, "prod/model.pkl");
            assert!(matches!(source, TransferError::Backend(_)));
        }
        other => panic!("expected transfer error, got {other:?}"),
    }
    assert_eq!(store.object_count(), 0);
    assert_eq!(audit.last().event, "publish_failed");
    assert_eq!(audit.last().error_kind, Some("transfer"));
}

#[test]
fn transfer_error_preserves_source_chain() {
    let artifact = sample_artifact();
    let (publisher, store, _audit) = publisher_fixture();
    store.fail_puts(1);

    let err = publisher.publish(&sample_request(artifact.path())).expect_err("transfer failure");

    let cause = err.source().expect("wrapped cause");
    assert!(cause.to_string().contains("injected transfer failure"));
}

// ============================================================================
// SECTION: Retry and Cleanup
// ============================================================================

#[test]
fn retry_after_transient_failure_writes_single_object() {
    let artifact = sample_artifact();
    let (publisher, store, _audit) = publisher_fixture();
    store.fail_puts(1);
    let request = sample_request(artifact.path());

    assert!(publisher.publish(&request).is_err());
    let record = publisher.publish(&request).expect("second attempt");

    assert_eq!(record.destination_key, "prod/model.pkl");
    assert_eq!(store.put_count(), 2);
    assert_eq!(store.object_count(), 1);
    assert_eq!(store.object("prod/model.pkl").as_deref(), Some(MODEL_BYTES));
}

#[test]
fn delete_source_removes_local_artifact_after_confirmed_upload() {
    let artifact = sample_artifact();
    let (publisher, store, _audit) = publisher_fixture();
    let request = sample_request(artifact.path()).with_delete_source(true);

    publisher.publish(&request).expect("publish");

    assert!(!request.source_path.exists());
    assert_eq!(store.object("prod/model.pkl").as_deref(), Some(MODEL_BYTES));
}

#[test]
fn failed_upload_leaves_local_artifact_in_place() {
    let artifact = sample_artifact();
    let (publisher, store, _audit) = publisher_fixture();
    store.fail_puts(1);
    let request = sample_request(artifact.path()).with_delete_source(true);

    assert!(publisher.publish(&request).is_err());

    assert!(request.source_path.exists());
    assert_eq!(store.object_count(), 0);
}
