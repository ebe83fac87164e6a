//! Expansion of stored `bucket,key` references into presigned URLs.

use crate::error::storage_error_to_app;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::models::{StoredVideoReference, Video, VideoResponse};
use tubely_core::AppError;
use tubely_storage::Storage;

/// Signs read URLs for stored videos. URLs are generated per read and never persisted.
#[derive(Clone)]
pub struct VideoUrlSigner {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl VideoUrlSigner {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub async fn presign(&self, reference: &StoredVideoReference) -> Result<String, AppError> {
        self.storage
            .presigned_get_url(&reference.bucket, &reference.key, self.ttl)
            .await
            .map_err(storage_error_to_app)
    }

    /// Build the client view of `video`, with `video_url` signed.
    ///
    /// A corrupt reference surfaces as `DataIntegrity`; a video without an upload yields
    /// `video_url: null`.
    pub async fn sign(&self, video: Video) -> Result<VideoResponse, AppError> {
        let url = match video.stored_reference()? {
            Some(reference) => Some(self.presign(&reference).await?),
            None => None,
        };
        Ok(VideoResponse::from_video(video, url))
    }

    /// Like [`sign`](Self::sign), but an unresolvable reference is logged and returned as
    /// `video_url: null` so one bad record does not fail a listing.
    pub async fn sign_or_null(&self, video: Video) -> VideoResponse {
        let video_id = video.id;
        let resolved = match video.stored_reference() {
            Ok(Some(reference)) => self.presign(&reference).await.map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match resolved {
            Ok(url) => VideoResponse::from_video(video, url),
            Err(e) => {
                tracing::warn!(video_id = %video_id, error = %e, "Failed to resolve video reference");
                VideoResponse::from_video(video, None)
            }
        }
    }
}
