//! In-memory object store for integration tests

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tubely_storage::{Storage, StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub content_length: u64,
}

/// Mock storage keeping objects in memory, keyed by `(bucket, key)`
#[derive(Default)]
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<(String, String), StoredObject>>>,
    put_failure: Mutex<Option<fn() -> StorageError>>,
    presign_failure: Mutex<Option<fn() -> StorageError>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts(&self) {
        self.fail_puts_with(|| StorageError::UploadFailed("503 Service Unavailable".to_string()));
    }

    /// Make every put fail with the error built by `make_error`
    pub fn fail_puts_with(&self, make_error: fn() -> StorageError) {
        *self.put_failure.lock().unwrap() = Some(make_error);
    }

    pub fn fail_presign(&self) {
        self.fail_presign_with(|| StorageError::PresignFailed("credentials expired".to_string()));
    }

    pub fn fail_presign_with(&self, make_error: fn() -> StorageError) {
        *self.presign_failure.lock().unwrap() = Some(make_error);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn get_object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        content_length: u64,
    ) -> StorageResult<()> {
        tubely_storage::traits::validate_storage_key(key)?;
        tubely_storage::traits::check_content_length(&body, content_length)?;
        if let Some(make_error) = *self.put_failure.lock().unwrap() {
            return Err(make_error());
        }

        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                content_length,
            },
        );
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        tubely_storage::traits::validate_storage_key(key)?;
        if let Some(make_error) = *self.presign_failure.lock().unwrap() {
            return Err(make_error());
        }
        Ok(format!(
            "https://{}.s3.test/{}?X-Amz-Expires={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}
