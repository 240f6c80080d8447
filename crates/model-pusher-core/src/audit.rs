// model-pusher-core/src/audit.rs
// ============================================================================
// Module: Publication Audit Logging
// Description: Structured audit events for model publication attempts.
// Purpose: Emit JSON-line audit logs without process-global state.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the audit event payload and sinks for publication
//! logging. The sink is injected into the publisher so deployments can
//! route events to their preferred logging pipeline without redesign, and
//! tests can capture them deterministically. Events are diagnostic only
//! and not part of the functional contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Publication attempt outcome classification.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublishOutcome {
    /// The step completed successfully.
    Ok,
    /// The step failed.
    Error,
}

impl PublishOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Publication audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct PublishAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Storage namespace targeted by the attempt.
    pub bucket: String,
    /// Destination object key targeted by the attempt.
    pub key: String,
    /// Local artifact path as supplied by the caller.
    pub source_path: String,
    /// Step outcome.
    pub outcome: PublishOutcome,
    /// Normalized error kind label when the step failed.
    pub error_kind: Option<&'static str>,
    /// Optional human-readable detail.
    pub message: Option<String>,
}

/// Returns the current wall-clock time in milliseconds since the epoch.
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for publication events.
pub trait PublishAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &PublishAuditEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl PublishAuditSink for StderrAuditSink {
    fn record(&self, event: &PublishAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl PublishAuditSink for FileAuditSink {
    fn record(&self, event: &PublishAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl PublishAuditSink for NoopAuditSink {
    fn record(&self, _event: &PublishAuditEvent) {}
}
