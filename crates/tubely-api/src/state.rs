//! Application state shared by all handlers.

use crate::auth::JwtService;
use crate::services::VideoIngestService;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoStore>,
    pub ingest: VideoIngestService,
    pub jwt: Arc<JwtService>,
}
