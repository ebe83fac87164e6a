//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::middleware::auth_middleware;
use crate::constants::{API_PREFIX, HTTP_CONCURRENCY_LIMIT};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tubely_core::Config;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = protected_routes(config).layer(axum::middleware::from_fn_with_state(
        state.jwt.clone(),
        auth_middleware,
    ));

    let docs = utoipa_rapidoc::RapiDoc::new(format!("{}/openapi.json", API_PREFIX))
        .path(format!("{}/docs", API_PREFIX));

    let app = public_routes()
        .merge(protected_routes)
        .merge(docs)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/healthz", API_PREFIX),
            get(handlers::health::liveness_check),
        )
        .route(
            &format!("{}/readyz", API_PREFIX),
            get(handlers::health::readiness_check),
        )
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

/// Routes behind bearer authentication
fn protected_routes(config: &Config) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/video_upload/{{video_id}}", API_PREFIX),
            post(handlers::video_upload::upload_video)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::max(config.max_upload_bytes()))
                // Bounds memory: each upload may buffer its remuxed file for the put.
                .layer(ConcurrencyLimitLayer::new(config.max_concurrent_uploads())),
        )
        .route(
            &format!("{}/videos", API_PREFIX),
            get(handlers::video_get::list_videos),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::video_get::get_video),
        )
}
