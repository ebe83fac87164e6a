//! Repository trait abstractions
//!
//! These traits define the interface the HTTP layer and the upload pipeline need from the
//! metadata store, allowing handlers to be tested without a database.

use async_trait::async_trait;
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Get a video by ID
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist the mutable fields of a video (`video_url`, `updated_at`).
    ///
    /// Fails with `NotFound` if the record no longer exists.
    async fn update_video(&self, video: &Video) -> Result<(), AppError>;

    /// List a user's videos, newest first
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> Result<(), AppError>;
}
