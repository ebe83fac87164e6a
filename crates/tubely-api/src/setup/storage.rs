//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use tubely_core::Config;
use tubely_storage::{create_storage, Storage};

pub fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing object storage...");
    let storage = create_storage(config)?;
    tracing::info!(
        bucket = ?config.s3_bucket(),
        region = ?config.s3_region(),
        endpoint = ?config.s3_endpoint(),
        "Object storage initialized successfully"
    );
    Ok(storage)
}
