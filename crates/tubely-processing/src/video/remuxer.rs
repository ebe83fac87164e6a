//! Fast-start remux through `ffmpeg`
//!
//! The container is rewritten with stream copy only, moving the `moov` atom to the front
//! so playback can start before the whole file is downloaded.

use super::{validate_executable, validate_media_path};
use crate::error::{ProcessingError, ProcessingResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempPath;
use tokio::process::Command;
use tubely_core::constants::REMUX_OUTPUT_SUFFIX;

#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Rewrite `input` for fast start. The returned path is deleted when dropped.
    async fn remux(&self, input: &Path) -> ProcessingResult<TempPath>;
}

/// Output location for a remux of `input`: the same path with `.processing` appended.
pub fn remux_output_path(input: &Path) -> PathBuf {
    let mut out = input.as_os_str().to_os_string();
    out.push(REMUX_OUTPUT_SUFFIX);
    PathBuf::from(out)
}

pub struct FfmpegRemuxer {
    ffmpeg_path: String,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>) -> ProcessingResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_executable(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path) -> ProcessingResult<TempPath> {
        let start = std::time::Instant::now();
        validate_media_path(input).map_err(|e| ProcessingError::RemuxFailure(e.to_string()))?;

        // Guard exists before ffmpeg runs so partial output is removed on failure.
        let output_path = TempPath::from_path(remux_output_path(input));

        let output = Command::new(&self.ffmpeg_path)
            .args(["-y", "-v", "error", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&*output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProcessingError::RemuxFailure(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessingError::RemuxFailure(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}
