use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::models::VideoResponse;
use tubely_core::AppError;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %auth.user_id, video_id = %video_id, operation = "get_video")
)]
pub async fn get_video(
    auth: AuthUser,
    Path(video_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    if !video.is_owned_by(auth.user_id) {
        return Err(AppError::Forbidden("You don't own this video".to_string()).into());
    }

    let response = state.ingest.signer().sign(video).await?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Videos owned by the caller", body = Vec<VideoResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, operation = "list_videos"))]
pub async fn list_videos(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state
        .videos
        .list_videos_for_user(auth.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list videos");
            HttpAppError::from(e)
        })?;

    let signer = state.ingest.signer();
    let mut responses = Vec::with_capacity(videos.len());
    for video in videos {
        responses.push(signer.sign_or_null(video).await);
    }

    Ok(Json(responses))
}
