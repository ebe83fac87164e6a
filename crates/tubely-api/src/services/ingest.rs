//! Video upload pipeline
//!
//! One request moves through the stages of [`IngestStage`] in order:
//!
//! 1. `validating`: load the record, check ownership, find the `video` field and its
//!    media type.
//! 2. `staging`: stream the field into a temp file and rewind it.
//! 3. `probing`: classify the aspect ratio with ffprobe.
//! 4. `remuxing`: rewrite the container for fast start; the staged file is deleted.
//! 5. `uploading`: put the remuxed artifact under a random key; the artifact is deleted.
//! 6. `persisting`: store `bucket,key` on the record.
//! 7. `done`: presign the new object for the response.
//!
//! The first failing stage aborts the request. Nothing is retried, and temp files are RAII
//! guards so every exit path removes them. A metadata failure after a successful upload
//! leaves the object orphaned; it is logged with its bucket and key.

use crate::error::{processing_error_to_app, storage_error_to_app};
use crate::services::video_urls::VideoUrlSigner;
use crate::utils::upload::{multipart_error, normalize_media_type, stage_field};
use axum::extract::Multipart;
use bytes::Bytes;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::models::{AspectClass, StoredVideoReference, Video, VideoResponse};
use tubely_core::{AppError, Config, ErrorMetadata, LogLevel, ProbeFailurePolicy};
use tubely_db::VideoStore;
use tubely_processing::{MediaProber, Remuxer};
use tubely_storage::{generate_video_key, Storage};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Validating,
    Staging,
    Probing,
    Remuxing,
    Uploading,
    Persisting,
    Done,
}

impl Display for IngestStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            IngestStage::Validating => "validating",
            IngestStage::Staging => "staging",
            IngestStage::Probing => "probing",
            IngestStage::Remuxing => "remuxing",
            IngestStage::Uploading => "uploading",
            IngestStage::Persisting => "persisting",
            IngestStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Pipeline settings, resolved once from configuration
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub bucket: String,
    pub accepted_content_type: String,
    pub max_upload_bytes: usize,
    pub temp_dir: PathBuf,
    pub presign_ttl: Duration,
    pub probe_failure_policy: ProbeFailurePolicy,
}

impl IngestSettings {
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let bucket = config
            .s3_bucket()
            .map(String::from)
            .ok_or_else(|| anyhow::anyhow!("S3_BUCKET must be set"))?;

        Ok(Self {
            bucket,
            accepted_content_type: config.accepted_content_type().to_string(),
            max_upload_bytes: config.max_upload_bytes(),
            temp_dir: config.temp_dir(),
            presign_ttl: config.presign_ttl(),
            probe_failure_policy: config.probe_failure_policy(),
        })
    }
}

/// Collaborators of the pipeline, injected at startup (or by tests)
#[derive(Clone)]
pub struct IngestContext {
    pub storage: Arc<dyn Storage>,
    pub videos: Arc<dyn VideoStore>,
    pub prober: Arc<dyn MediaProber>,
    pub remuxer: Arc<dyn Remuxer>,
    pub settings: IngestSettings,
}

/// Upload staged to local disk, rewound to byte 0
struct StagedUpload {
    file: NamedTempFile,
    media_type: String,
    size: u64,
}

#[derive(Clone)]
pub struct VideoIngestService {
    ctx: IngestContext,
    signer: VideoUrlSigner,
}

/// Log a stage failure once, at the error's own level, and pass the error through.
fn failed(stage: IngestStage, video_id: Uuid, err: AppError) -> AppError {
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(stage = %stage, video_id = %video_id, error = %err, "Video upload rejected")
        }
        LogLevel::Warn => {
            tracing::warn!(stage = %stage, video_id = %video_id, error = %err, "Video upload failed")
        }
        LogLevel::Error => {
            tracing::error!(stage = %stage, video_id = %video_id, error = %err, "Video upload failed")
        }
    }
    err
}

impl VideoIngestService {
    pub fn new(ctx: IngestContext) -> Self {
        let signer = VideoUrlSigner::new(ctx.storage.clone(), ctx.settings.presign_ttl);
        Self { ctx, signer }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.ctx.settings
    }

    /// Signer sharing this pipeline's storage and TTL
    pub fn signer(&self) -> &VideoUrlSigner {
        &self.signer
    }

    /// Replace the video file of `video_id` with the upload in `multipart`.
    #[tracing::instrument(skip(self, multipart), fields(video_id = %video_id, user_id = %caller))]
    pub async fn ingest(
        &self,
        video_id: Uuid,
        caller: Uuid,
        multipart: Multipart,
    ) -> Result<VideoResponse, AppError> {
        let start = std::time::Instant::now();

        let mut video = self
            .authorize(video_id, caller)
            .await
            .map_err(|e| failed(IngestStage::Validating, video_id, e))?;

        let staged = self.stage(video_id, multipart).await?;
        tracing::debug!(
            size_bytes = staged.size,
            media_type = %staged.media_type,
            "Upload staged"
        );

        let aspect = self.classify(video_id, &staged).await?;

        let artifact = self
            .ctx
            .remuxer
            .remux(staged.file.path())
            .await
            .map_err(|e| failed(IngestStage::Remuxing, video_id, processing_error_to_app(e)))?;

        let StagedUpload {
            file, media_type, ..
        } = staged;
        if let Err(e) = file.close() {
            tracing::warn!(error = %e, "Failed to remove staged upload");
        }

        let key = generate_video_key(aspect, &media_type);
        let bucket = self.ctx.settings.bucket.clone();
        let upload_result = self.upload(&artifact, &bucket, &key, &media_type).await;
        drop(artifact);
        upload_result.map_err(|e| failed(IngestStage::Uploading, video_id, e))?;

        let reference = StoredVideoReference::new(bucket, key);
        video.set_stored_reference(&reference);
        if let Err(e) = self.ctx.videos.update_video(&video).await {
            tracing::error!(
                bucket = %reference.bucket,
                key = %reference.key,
                "Uploaded object is orphaned: video record was not updated"
            );
            return Err(failed(
                IngestStage::Persisting,
                video_id,
                AppError::MetadataFailure(e.to_string()),
            ));
        }

        // The record now points at the new object even if signing fails.
        let url = self
            .signer
            .presign(&reference)
            .await
            .map_err(|e| failed(IngestStage::Done, video_id, e))?;

        tracing::info!(
            aspect = %aspect,
            bucket = %reference.bucket,
            key = %reference.key,
            duration_ms = start.elapsed().as_millis(),
            "Video upload completed"
        );

        Ok(VideoResponse::from_video(video, Some(url)))
    }

    /// Load the record and check the caller owns it. Runs before the body is read.
    async fn authorize(&self, video_id: Uuid, caller: Uuid) -> Result<Video, AppError> {
        let video = self
            .ctx
            .videos
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        if !video.is_owned_by(caller) {
            return Err(AppError::Forbidden(
                "Only the owner of a video may upload to it".to_string(),
            ));
        }

        Ok(video)
    }

    async fn stage(&self, video_id: Uuid, mut multipart: Multipart) -> Result<StagedUpload, AppError> {
        let settings = &self.ctx.settings;
        let mut staged: Option<StagedUpload> = None;

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, settings.max_upload_bytes))
            .map_err(|e| failed(IngestStage::Validating, video_id, e))?
        {
            if field.name() != Some(VIDEO_FORM_FIELD) {
                continue;
            }
            if staged.is_some() {
                return Err(failed(
                    IngestStage::Validating,
                    video_id,
                    AppError::BadRequest(format!(
                        "Multiple '{}' fields are not allowed",
                        VIDEO_FORM_FIELD
                    )),
                ));
            }

            let media_type = normalize_media_type(field.content_type().unwrap_or_default())
                .map_err(|e| failed(IngestStage::Validating, video_id, e))?;
            if media_type != settings.accepted_content_type {
                return Err(failed(
                    IngestStage::Validating,
                    video_id,
                    AppError::UnsupportedMediaType(format!(
                        "Invalid file type '{}', only {} is allowed",
                        media_type, settings.accepted_content_type
                    )),
                ));
            }

            let file = NamedTempFile::new_in(&settings.temp_dir)
                .map_err(|e| failed(IngestStage::Staging, video_id, e.into()))?;
            let size = stage_field(&mut field, &file, settings.max_upload_bytes)
                .await
                .map_err(|e| failed(IngestStage::Staging, video_id, e))?;
            if size == 0 {
                return Err(failed(
                    IngestStage::Staging,
                    video_id,
                    AppError::BadRequest("Uploaded video is empty".to_string()),
                ));
            }

            staged = Some(StagedUpload {
                file,
                media_type,
                size,
            });
        }

        staged.ok_or_else(|| {
            failed(
                IngestStage::Validating,
                video_id,
                AppError::BadRequest(format!("Missing '{}' file field", VIDEO_FORM_FIELD)),
            )
        })
    }

    async fn classify(&self, video_id: Uuid, staged: &StagedUpload) -> Result<AspectClass, AppError> {
        match self.ctx.prober.classify(staged.file.path()).await {
            Ok(aspect) => Ok(aspect),
            Err(e) => match self.ctx.settings.probe_failure_policy {
                ProbeFailurePolicy::Fatal => Err(failed(
                    IngestStage::Probing,
                    video_id,
                    processing_error_to_app(e),
                )),
                ProbeFailurePolicy::Degrade => {
                    tracing::warn!(
                        stage = %IngestStage::Probing,
                        video_id = %video_id,
                        error = %e,
                        "Probe failed, storing under the 'other' prefix"
                    );
                    Ok(AspectClass::Other)
                }
            },
        }
    }

    /// Read the remuxed artifact and put it, declaring its measured length.
    async fn upload(
        &self,
        artifact: &std::path::Path,
        bucket: &str,
        key: &str,
        media_type: &str,
    ) -> Result<(), AppError> {
        let measured = tokio::fs::metadata(artifact).await?.len();
        let body = tokio::fs::read(artifact).await?;
        if body.len() as u64 != measured {
            return Err(AppError::Internal(format!(
                "Remuxed file changed while reading: expected {} bytes, read {}",
                measured,
                body.len()
            )));
        }

        self.ctx
            .storage
            .put_object(bucket, key, Bytes::from(body), media_type, measured)
            .await
            .map_err(storage_error_to_app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(IngestStage::Validating.to_string(), "validating");
        assert_eq!(IngestStage::Remuxing.to_string(), "remuxing");
        assert_eq!(IngestStage::Done.to_string(), "done");
    }

    #[test]
    fn test_failed_passes_error_through() {
        let err = failed(
            IngestStage::Uploading,
            Uuid::nil(),
            AppError::StorageFailure("put".to_string()),
        );
        assert_eq!(err.error_code(), "STORAGE_FAILURE");
    }
}
