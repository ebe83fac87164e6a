use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::models::VideoResponse;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "One file field named 'video'"),
    responses(
        (status = 200, description = "Video uploaded successfully", body = VideoResponse),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 415, description = "Unsupported media type", body = ErrorResponse),
        (status = 422, description = "Video could not be processed", body = ErrorResponse),
        (status = 502, description = "Object storage failure", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state
        .ingest
        .ingest(video_id, auth.user_id, multipart)
        .await?;

    Ok(Json(response))
}
