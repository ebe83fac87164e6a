//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use tubely_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video upload and playback API. Uploaded MP4s are remuxed for fast start, classified by aspect ratio and served through presigned URLs."
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::video_get::get_video,
        handlers::video_get::list_videos,
        handlers::health::liveness_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        models::VideoResponse,
        models::AspectClass,
        error::ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video upload and retrieval"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/video_upload/{video_id}"));
        assert!(paths.iter().any(|p| *p == "/api/videos"));
        assert!(paths.iter().any(|p| *p == "/api/readyz"));
    }
}
