//! Tubely API Library
//!
//! HTTP surface of the video service: the upload pipeline, read endpoints, bearer
//! authentication and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::{IngestContext, IngestSettings, IngestStage, VideoIngestService};
pub use state::AppState;
