// model-pusher-config/src/config.rs
// ============================================================================
// Module: Model Pusher Configuration
// Description: Configuration loading and validation for the publish stage.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: model-pusher-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits. Missing or invalid configuration fails closed: the publisher
//! only ever sees coordinates that passed validation. Bucket and key are
//! otherwise opaque strings; the store owns deeper key semantics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use model_pusher_core::FileAuditSink;
use model_pusher_core::NoopAuditSink;
use model_pusher_core::PublishAuditSink;
use model_pusher_core::PublishRequest;
use model_pusher_core::StderrAuditSink;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "model-pusher.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MODEL_PUSHER_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single key or prefix segment.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total key or prefix length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Storage Configuration
// ============================================================================

/// Supported object-store providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageProvider {
    /// Amazon S3 compatible object storage.
    S3,
}

/// Object-store configuration for model publication.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Provider selection for the object store.
    pub provider: StorageProvider,
    /// Bucket name receiving published models.
    pub bucket: String,
    /// Optional region (S3-only, defaults to environment).
    #[serde(default)]
    pub region: Option<String>,
    /// Optional object-store endpoint (S3-compatible).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Optional key prefix inside the bucket.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Force path-style addressing (S3-compatible).
    #[serde(default)]
    pub force_path_style: bool,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
}

impl StorageConfig {
    /// Validates object-store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when storage settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.bucket must be set".to_string()));
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "storage.endpoint must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "storage.endpoint uses http:// without allow_http".to_string(),
                ));
            }
        }
        if let Some(prefix) = &self.prefix {
            validate_storage_prefix(prefix)?;
        }
        Ok(())
    }
}

/// Validates an object-store key prefix.
fn validate_storage_prefix(prefix: &str) -> Result<(), ConfigError> {
    let trimmed = prefix.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid("storage.prefix must not be blank".to_string()));
    }
    if trimmed.starts_with('/') {
        return Err(ConfigError::Invalid(
            "storage.prefix must be relative (no leading slash)".to_string(),
        ));
    }
    if trimmed.contains('\\') {
        return Err(ConfigError::Invalid(
            "storage.prefix must not contain backslashes".to_string(),
        ));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("storage.prefix exceeds length limit".to_string()));
    }
    for segment in trimmed.trim_end_matches('/').split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(ConfigError::Invalid("storage.prefix segment is invalid".to_string()));
        }
        if segment.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(
                "storage.prefix segment exceeds length limit".to_string(),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Publish Configuration
// ============================================================================

/// Publication settings for one pipeline run.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishConfig {
    /// Destination key under which the model is stored.
    pub model_key: String,
    /// Remove the local artifact after a confirmed upload.
    #[serde(default)]
    pub delete_source: bool,
}

impl PublishConfig {
    /// Validates publication settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when publication settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_key.trim().is_empty() {
            return Err(ConfigError::Invalid("publish.model_key must be set".to_string()));
        }
        if self.model_key.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("publish.model_key exceeds length limit".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit Configuration
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines to stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    None,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Sink receiving publication audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (required for the file sink).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when audit settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sink == AuditSinkKind::File && self.path.is_none() {
            return Err(ConfigError::Invalid(
                "audit.path must be set for the file sink".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn PublishAuditSink>, ConfigError> {
        match self.sink {
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::File => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path must be set for the file sink".to_string())
                })?;
                let sink =
                    FileAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
        }
    }
}

// ============================================================================
// SECTION: Top-Level Configuration
// ============================================================================

/// Canonical model-pusher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelPusherConfig {
    /// Object-store settings.
    pub storage: StorageConfig,
    /// Publication settings.
    pub publish: PublishConfig,
    /// Audit logging settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl ModelPusherConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then [`CONFIG_ENV_VAR`], then
    /// `model-pusher.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage.validate()?;
        self.publish.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Resolves a publish request for the given local artifact.
    #[must_use]
    pub fn publish_request(&self, source_path: &Path) -> PublishRequest {
        PublishRequest::new(source_path, &self.storage.bucket, &self.publish.model_key)
            .with_delete_source(self.publish.delete_source)
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the sink cannot be constructed.
    pub fn audit_sink(&self) -> Result<Arc<dyn PublishAuditSink>, ConfigError> {
        self.audit.build_sink()
    }
}

/// Resolves the configuration path from explicit input, env, or default.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    path.map_or_else(
        || {
            env::var(CONFIG_ENV_VAR)
                .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from)
        },
        Path::to_path_buf,
    )
}
