//! Tubely Core Library
//!
//! Domain models, error types and configuration shared by every tubely crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, IngestConfig, ProbeFailurePolicy, ServerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
