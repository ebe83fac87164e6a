use crate::traits::{check_content_length, validate_storage_key, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// S3 storage implementation
///
/// `object_store` clients are bound to one bucket, so a client is built per bucket on
/// first use and cached.
pub struct S3Storage {
    stores: RwLock<HashMap<String, AmazonS3>>,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `default_bucket` - bucket whose client is built eagerly, so misconfiguration fails at startup
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        default_bucket: &str,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let storage = S3Storage {
            stores: RwLock::new(HashMap::new()),
            region,
            endpoint_url,
        };
        storage.store_for(default_bucket)?;
        Ok(storage)
    }

    fn build_store(&self, bucket: &str) -> StorageResult<AmazonS3> {
        // Credentials come from the standard AWS_* environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket);

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn store_for(&self, bucket: &str) -> StorageResult<AmazonS3> {
        if bucket.is_empty() {
            return Err(StorageError::ConfigError("empty bucket name".to_string()));
        }

        if let Some(store) = self
            .stores
            .read()
            .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?
            .get(bucket)
        {
            return Ok(store.clone());
        }

        let store = self.build_store(bucket)?;
        self.stores
            .write()
            .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?
            .entry(bucket.to_string())
            .or_insert_with(|| store.clone());
        Ok(store)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        content_length: u64,
    ) -> StorageResult<()> {
        validate_storage_key(key)?;
        check_content_length(&body, content_length)?;
        let store = self.store_for(bucket)?;
        let location = Path::from(key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store
            .put_opts(&location, PutPayload::from(body), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = content_length,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = content_length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_storage_key(key)?;
        let store = self.store_for(bucket)?;
        let location = Path::from(key.to_string());

        let url_result: ObjectResult<_> = store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| {
                tracing::warn!(error = %e, bucket = %bucket, key = %key, "S3 presign failed");
                StorageError::PresignFailed(e.to_string())
            })?
            .to_string();

        Ok(url)
    }
}
