// model-pusher-store-s3/src/store.rs
// ============================================================================
// Module: S3 Model Store
// Description: Object-store adapter uploading model artifacts to S3.
// Purpose: Implement the model store capability over aws-sdk-s3.
// Dependencies: model-pusher-config, model-pusher-core, aws-sdk-s3, tokio
// ============================================================================

//! ## Overview
//! This module implements [`ModelStore`] against S3-compatible object
//! storage. Destination keys are validated before any remote call and the
//! configured prefix is applied to every key. A put is a single
//! `PutObject`: the object-store write is atomic at single-object
//! granularity and overwrites any prior object at the key, so a failed
//! attempt leaves no externally visible partial object and re-invoking is
//! safe. The local artifact is removed only after the remote write is
//! confirmed, and only when requested.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::future::Future;
use std::path::Component;
use std::path::Path;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use model_pusher_config::StorageConfig;
use model_pusher_config::StorageProvider;
use model_pusher_core::ModelStore;
use model_pusher_core::SourceDisposition;
use model_pusher_core::TransferError;
use tokio::runtime::Handle;
use tokio::runtime::Runtime;
use tokio::runtime::RuntimeFlavor;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a single key segment.
const MAX_KEY_COMPONENT_LENGTH: usize = 255;
/// Maximum total key length.
const MAX_TOTAL_KEY_LENGTH: usize = 4096;
/// Content type attached to uploaded model artifacts.
const MODEL_CONTENT_TYPE: &str = "application/octet-stream";

// ============================================================================
// SECTION: Runtime Helpers
// ============================================================================

/// Blocks on a store future using a compatible runtime.
fn block_on_with_runtime<F, T>(runtime: &Runtime, future: F) -> Result<T, TransferError>
where
    F: Future<Output = Result<T, TransferError>> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) {
            return tokio::task::block_in_place(|| handle.block_on(future));
        }
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let result = Runtime::new()
                .map_err(|err| TransferError::Io(err.to_string()))
                .and_then(|runtime| runtime.block_on(future));
            let _ = tx.send(result);
        });
        return rx
            .recv()
            .unwrap_or_else(|_| Err(TransferError::Io("model store thread join failed".to_string())));
    }

    runtime.block_on(future)
}

// ============================================================================
// SECTION: S3 Store
// ============================================================================

/// S3-backed model store.
pub struct S3ModelStore {
    /// Underlying S3 client.
    client: Client,
    /// Bucket name receiving published models.
    bucket: String,
    /// Normalized prefix applied to all keys.
    prefix: String,
    /// Tokio runtime for blocking S3 operations.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for S3ModelStore {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl S3ModelStore {
    /// Builds a new S3-backed model store from storage configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] when configuration or client
    /// initialization fails.
    pub fn new(config: &StorageConfig) -> Result<Self, TransferError> {
        config.validate().map_err(|err| TransferError::Invalid(err.to_string()))?;
        let StorageProvider::S3 = config.provider;
        let prefix = normalize_prefix(config.prefix.as_deref().unwrap_or(""))?;
        let runtime = Runtime::new().map_err(|err| TransferError::Io(err.to_string()))?;
        let region = config.region.clone();
        let endpoint = config.endpoint.clone();
        let shared_config = block_on_with_runtime(&runtime, async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region));
            }
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            Ok(loader.load().await)
        })?;
        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if config.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        let client = Client::from_conf(s3_builder.build());
        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            prefix,
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Returns the storage URI for a destination key.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] when the key is invalid.
    pub fn object_uri(&self, destination_key: &str) -> Result<String, TransferError> {
        let key = self.object_key(destination_key)?;
        Ok(format!("s3://{}/{}", self.bucket, key))
    }

    /// Returns the prefixed object key for a destination key.
    fn object_key(&self, destination_key: &str) -> Result<String, TransferError> {
        validate_destination_key(destination_key)?;
        let candidate = prefixed_key(&self.prefix, destination_key);
        if candidate.len() > MAX_TOTAL_KEY_LENGTH {
            return Err(TransferError::Invalid("object key exceeds length limit".to_string()));
        }
        Ok(candidate)
    }

    /// Returns the runtime or an error if shutdown.
    fn runtime(&self) -> Result<&Runtime, TransferError> {
        self.runtime
            .as_ref()
            .map(AsRef::as_ref)
            .ok_or_else(|| TransferError::Io("model store runtime closed".to_string()))
    }
}

impl ModelStore for S3ModelStore {
    fn put(
        &self,
        source_path: &Path,
        destination_key: &str,
        delete_source: bool,
    ) -> Result<SourceDisposition, TransferError> {
        let key = self.object_key(destination_key)?;
        let bucket = self.bucket.clone();
        let client = self.client.clone();
        let source = source_path.to_path_buf();
        block_on_with_runtime(self.runtime()?, async move {
            let body = ByteStream::from_path(&source)
                .await
                .map_err(|err| TransferError::Io(format!("local artifact read failed: {err}")))?;
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .content_type(MODEL_CONTENT_TYPE)
                .body(body)
                .send()
                .await
                .map_err(|err| TransferError::Backend(err.to_string()))?;
            Ok(())
        })?;
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

// ============================================================================
// SECTION: Key Helpers
// ============================================================================

/// Applies a normalized prefix to a destination key.
fn prefixed_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() { key.to_string() } else { format!("{prefix}{key}") }
}

/// Normalizes a root prefix string for object storage.
fn normalize_prefix(raw: &str) -> Result<String, TransferError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.starts_with('/') {
        return Err(TransferError::Invalid(
            "prefix must be relative (no leading slash)".to_string(),
        ));
    }
    let normalized = trimmed.strip_suffix('/').unwrap_or(trimmed);
    validate_destination_key(normalized)?;
    Ok(format!("{normalized}/"))
}

/// Validates a destination key string.
fn validate_destination_key(key: &str) -> Result<(), TransferError> {
    if key.is_empty() {
        return Err(TransferError::Invalid("destination key must be set".to_string()));
    }
    if key.contains('\\') {
        return Err(TransferError::Invalid(
            "destination key must not contain backslashes".to_string(),
        ));
    }
    if key.len() > MAX_TOTAL_KEY_LENGTH {
        return Err(TransferError::Invalid("destination key exceeds length limit".to_string()));
    }
    let candidate = Path::new(key);
    if candidate.is_absolute() {
        return Err(TransferError::Invalid("destination key must be relative".to_string()));
    }
    for component in candidate.components() {
        match component {
            Component::Normal(value) => {
                let segment = value.to_string_lossy();
                validate_segment(&segment)?;
            }
            _ => {
                return Err(TransferError::Invalid(
                    "destination key must be relative without traversal".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Validates a single key segment.
fn validate_segment(value: &str) -> Result<(), TransferError> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(TransferError::Invalid("key segment is invalid".to_string()));
    }
    if value.len() > MAX_KEY_COMPONENT_LENGTH {
        return Err(TransferError::Invalid("key segment exceeds length limit".to_string()));
    }
    if value.contains(['/', '\\']) {
        return Err(TransferError::Invalid("key segment contains invalid characters".to_string()));
    }
    Ok(())
}
