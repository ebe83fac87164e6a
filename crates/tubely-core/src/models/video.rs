use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::storage::StoredVideoReference;
use crate::AppError;

/// A video record as kept by the metadata store.
///
/// `video_url` holds an encoded [`StoredVideoReference`] once an upload has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Decode the stored reference, if the video has been uploaded.
    pub fn stored_reference(&self) -> Result<Option<StoredVideoReference>, AppError> {
        self.video_url
            .as_deref()
            .map(StoredVideoReference::decode)
            .transpose()
    }

    /// Point the record at a newly stored object and bump `updated_at`.
    pub fn set_stored_reference(&mut self, reference: &StoredVideoReference) {
        self.video_url = Some(reference.encode());
        self.updated_at = Utc::now();
    }
}

/// Video as returned to API clients; `video_url` is a presigned URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_video(video: Video, signed_url: Option<String>) -> Self {
        VideoResponse {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            thumbnail_url: video.thumbnail_url,
            video_url: signed_url,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}
