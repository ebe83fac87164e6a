#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::Config;

/// Create the storage backend described by configuration
pub fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let bucket = config
        .s3_bucket()
        .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
    let region = config.s3_region().map(String::from).ok_or_else(|| {
        StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
    })?;

    #[cfg(feature = "storage-s3")]
    {
        let endpoint = config.s3_endpoint().map(String::from);
        let storage = S3Storage::new(bucket, region, endpoint)?;
        tracing::info!(bucket = %bucket, "S3 storage initialized");
        Ok(Arc::new(storage))
    }

    #[cfg(not(feature = "storage-s3"))]
    {
        let _ = (bucket, region);
        Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        ))
    }
}
