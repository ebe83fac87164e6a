//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::auth::JwtService;
use crate::services::{IngestContext, IngestSettings, VideoIngestService};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{FfmpegRemuxer, FfprobeProber};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())?;
    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config)?;

    let prober = FfprobeProber::new(config.ffprobe_path()).context("Invalid FFPROBE_PATH")?;
    let remuxer = FfmpegRemuxer::new(config.ffmpeg_path()).context("Invalid FFMPEG_PATH")?;
    let mut settings = IngestSettings::from_config(&config)?;
    settings.temp_dir = prepare_temp_dir(&settings.temp_dir)?;

    let videos = Arc::new(VideoRepository::new(pool));
    let ingest = VideoIngestService::new(IngestContext {
        storage,
        videos: videos.clone(),
        prober: Arc::new(prober),
        remuxer: Arc::new(remuxer),
        settings,
    });

    let state = Arc::new(AppState {
        jwt: Arc::new(JwtService::new(config.jwt_secret())),
        videos,
        ingest,
        config,
    });

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}

/// Create the upload staging directory and resolve it to an absolute path.
///
/// The media tools only accept absolute input paths, so a relative `UPLOAD_TEMP_DIR`
/// is resolved here once instead of failing every upload.
pub fn prepare_temp_dir(temp_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(temp_dir)
        .with_context(|| format!("Failed to create upload temp dir {}", temp_dir.display()))?;
    std::fs::canonicalize(temp_dir)
        .with_context(|| format!("Failed to resolve upload temp dir {}", temp_dir.display()))
}
