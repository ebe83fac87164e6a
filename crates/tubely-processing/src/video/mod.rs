//! Video processing module

pub mod prober;
pub mod remuxer;

pub use prober::{FfprobeProber, MediaProber, VideoGeometry};
pub use remuxer::{FfmpegRemuxer, Remuxer};

use crate::error::ProcessingError;
use std::path::Path;

/// Validate that a configured tool path doesn't contain shell metacharacters or
/// directory traversal
pub(crate) fn validate_path(path: &str) -> Result<(), ProcessingError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProcessingError::InvalidConfiguration(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(ProcessingError::InvalidConfiguration(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

/// Validate a configured executable path (`ffprobe`, `/usr/bin/ffmpeg`, ...)
pub(crate) fn validate_executable(path: &str) -> Result<(), ProcessingError> {
    if path.is_empty() {
        return Err(ProcessingError::InvalidConfiguration(
            "Executable path is empty".to_string(),
        ));
    }
    validate_path(path)?;

    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\')
    {
        return Err(ProcessingError::InvalidConfiguration(format!(
            "Executable path contains unsafe characters: {}",
            path
        )));
    }

    Ok(())
}

/// Check a media file path before handing it to a tool.
///
/// Paths are passed as a single argv entry and never through a shell, so any characters
/// are allowed. A relative path could start with `-` and be parsed as an option.
pub(crate) fn validate_media_path(path: &Path) -> Result<(), ProcessingError> {
    if !path.is_absolute() {
        return Err(ProcessingError::InvalidConfiguration(format!(
            "Media path must be absolute: {}",
            path.display()
        )));
    }
    Ok(())
}
