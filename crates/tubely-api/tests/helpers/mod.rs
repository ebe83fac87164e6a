#![allow(dead_code)]

pub mod fixtures;
pub mod mock_storage;
pub mod mock_videos;

use axum_test::TestServer;
use mock_storage::MockStorage;
use mock_videos::InMemoryVideoStore;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtService;
use tubely_api::setup::routes::setup_routes;
use tubely_api::{AppState, IngestContext, IngestSettings, VideoIngestService};
use tubely_core::config::{IngestConfig, ServerConfig};
use tubely_core::constants::{DEFAULT_PRESIGN_TTL_SECS, DEFAULT_VIDEO_CONTENT_TYPE};
use tubely_core::models::StoredVideoReference;
use tubely_core::{Config, ProbeFailurePolicy};
use tubely_processing::test_helpers::{FakeProber, FakeRemuxer};
use uuid::Uuid;

pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_JWT_SECRET: &str = "test-secret-with-at-least-32-characters";

/// Returns the API path for `path`, e.g. `/videos` -> `/api/videos`.
pub fn api_path(path: &str) -> String {
    format!("{}{}", tubely_api::constants::API_PREFIX, path)
}

/// Knobs for a test application; defaults succeed end to end.
pub struct TestOptions {
    pub prober: FakeProber,
    pub remuxer: FakeRemuxer,
    pub probe_failure_policy: ProbeFailurePolicy,
    pub max_upload_bytes: usize,
    pub max_concurrent_uploads: usize,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            prober: FakeProber::landscape(),
            remuxer: FakeRemuxer::copying(),
            probe_failure_policy: ProbeFailurePolicy::Fatal,
            max_upload_bytes: 1024 * 1024,
            max_concurrent_uploads: 4,
        }
    }
}

/// Test application state
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MockStorage>,
    pub videos: Arc<InMemoryVideoStore>,
    pub prober: Arc<FakeProber>,
    pub remuxer: Arc<FakeRemuxer>,
    pub jwt: Arc<JwtService>,
    pub owner_id: Uuid,
    pub video_id: Uuid,
    pub temp_dir: TempDir,
}

impl TestApp {
    /// Get the HTTP test client
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.jwt
            .issue_token(user_id, None)
            .expect("Failed to issue test token")
    }

    pub fn owner_token(&self) -> String {
        self.token_for(self.owner_id)
    }

    pub fn upload_path(&self) -> String {
        api_path(&format!("/video_upload/{}", self.video_id))
    }

    /// Number of entries left in the staging directory
    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path())
            .expect("Failed to read temp dir")
            .count()
    }

    /// Decoded reference currently stored on the seeded video
    pub fn stored_reference(&self) -> Option<StoredVideoReference> {
        self.videos
            .video(self.video_id)
            .and_then(|v| v.stored_reference().expect("Stored reference is corrupt"))
    }
}

pub fn test_config(temp_dir: &TempDir, options: &TestOptions) -> Config {
    Config {
        server: ServerConfig {
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            database_url: "postgres://unused".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 1,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            log_format: "text".to_string(),
        },
        ingest: IngestConfig {
            s3_bucket: Some(TEST_BUCKET.to_string()),
            s3_region: Some("us-east-1".to_string()),
            s3_endpoint: None,
            aws_region: None,
            max_upload_bytes: options.max_upload_bytes,
            max_concurrent_uploads: options.max_concurrent_uploads,
            accepted_content_type: DEFAULT_VIDEO_CONTENT_TYPE.to_string(),
            temp_dir: Some(temp_dir.path().to_path_buf()),
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            presign_ttl_secs: DEFAULT_PRESIGN_TTL_SECS,
            probe_failure_policy: options.probe_failure_policy,
        },
    }
}

/// Setup a test application with one video owned by a fresh user
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default())
}

pub fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp_dir, &options);

    let storage = Arc::new(MockStorage::new());
    let videos = Arc::new(InMemoryVideoStore::new());
    let prober = Arc::new(options.prober);
    let remuxer = Arc::new(options.remuxer);
    let jwt = Arc::new(JwtService::new(TEST_JWT_SECRET));

    let owner_id = Uuid::new_v4();
    let video_id = videos.add_video(owner_id, "Boots: the movie");

    let settings = IngestSettings::from_config(&config).expect("Failed to build ingest settings");
    let ingest = VideoIngestService::new(IngestContext {
        storage: storage.clone(),
        videos: videos.clone(),
        prober: prober.clone(),
        remuxer: remuxer.clone(),
        settings,
    });

    let state = Arc::new(AppState {
        config: config.clone(),
        videos: videos.clone(),
        ingest,
        jwt: jwt.clone(),
    });

    let app = setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        videos,
        prober,
        remuxer,
        jwt,
        owner_id,
        video_id,
        temp_dir,
    }
}
