//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Content length mismatch: declared {declared} bytes, body has {actual} bytes")]
    ContentLengthMismatch { declared: u64, actual: u64 },

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object store gateway
///
/// Every call is a single network attempt; callers decide what a failure means.
/// Buckets are passed explicitly so a stored `bucket,key` reference can always be
/// resolved, even after the default bucket changes.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload `body` under `key`.
    ///
    /// `content_length` must equal `body.len()`; the length is declared up front and a
    /// mismatch is rejected before anything is sent.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        content_length: u64,
    ) -> StorageResult<()>;

    /// Generate a time-bounded GET URL for a private object.
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}

/// Reject keys that would escape their prefix or break the `bucket,key` encoding.
pub fn validate_storage_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty key".to_string()));
    }
    if key.starts_with('/') || key.contains("..") || key.contains(',') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Check a declared content length against the actual body.
pub fn check_content_length(body: &Bytes, content_length: u64) -> StorageResult<()> {
    let actual = body.len() as u64;
    if actual != content_length {
        return Err(StorageError::ContentLengthMismatch {
            declared: content_length,
            actual,
        });
    }
    Ok(())
}
