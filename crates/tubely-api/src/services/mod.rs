//! Application services

pub mod ingest;
pub mod video_urls;

pub use ingest::{IngestContext, IngestSettings, IngestStage, VideoIngestService};
pub use video_urls::VideoUrlSigner;
