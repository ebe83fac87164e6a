use crate::traits::VideoStore;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

const VIDEO_COLUMNS: &str =
    "id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at";

/// Repository for video records
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get video by ID
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    pub async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Update the stored reference of a video
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    pub async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET video_url = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(&video.video_url)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Video {} not found", video.id)));
        }

        Ok(())
    }

    /// List videos owned by a user, newest first
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    pub async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<Postgres, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        VideoRepository::get_video(self, id).await
    }

    async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        VideoRepository::update_video(self, video).await
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        VideoRepository::list_videos_for_user(self, user_id).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        VideoRepository::ping(self).await
    }
}
