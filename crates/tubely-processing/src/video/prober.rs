//! Aspect-ratio probing through `ffprobe`

use super::{validate_executable, validate_media_path};
use crate::error::{ProcessingError, ProcessingResult};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tubely_core::models::AspectClass;

/// Pixel dimensions of the first video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoGeometry {
    pub width: u64,
    pub height: u64,
}

impl VideoGeometry {
    pub fn aspect_class(&self) -> AspectClass {
        AspectClass::from_dimensions(self.width as f64, self.height as f64)
    }
}

/// Reads the geometry of a staged upload
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> ProcessingResult<VideoGeometry>;

    async fn classify(&self, path: &Path) -> ProcessingResult<AspectClass> {
        Ok(self.probe(path).await?.aspect_class())
    }
}

pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>) -> ProcessingResult<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_executable(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> ProcessingResult<VideoGeometry> {
        let start = std::time::Instant::now();
        validate_media_path(path).map_err(|e| ProcessingError::ProbeFailure(e.to_string()))?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| ProcessingError::ProbeFailure(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(ProcessingError::ProbeFailure(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let geometry = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = geometry.width,
            height = geometry.height,
            "Video probe completed"
        );

        Ok(geometry)
    }
}

/// Extract the first stream's dimensions from `ffprobe -print_format json` output.
pub fn parse_probe_output(stdout: &[u8]) -> ProcessingResult<VideoGeometry> {
    let probe_data: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::ProbeFailure(format!("Failed to parse ffprobe output: {}", e)))?;

    let stream = probe_data
        .get("streams")
        .and_then(|s| s.get(0))
        .ok_or_else(|| ProcessingError::ProbeFailure("No video stream found".to_string()))?;

    let width = stream
        .get("width")
        .and_then(|w| w.as_u64())
        .ok_or_else(|| ProcessingError::ProbeFailure("Could not parse width".to_string()))?;

    let height = stream
        .get("height")
        .and_then(|h| h.as_u64())
        .ok_or_else(|| ProcessingError::ProbeFailure("Could not parse height".to_string()))?;

    Ok(VideoGeometry { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_landscape_stream() {
        let json = br#"{"streams":[{"index":0,"codec_type":"video","width":1920,"height":1080}]}"#;
        let geometry = parse_probe_output(json).unwrap();
        assert_eq!(
            geometry,
            VideoGeometry {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(geometry.aspect_class(), AspectClass::Landscape);
    }

    #[test]
    fn test_parse_portrait_stream() {
        let json = br#"{"streams":[{"width":1080,"height":1920}]}"#;
        assert_eq!(
            parse_probe_output(json).unwrap().aspect_class(),
            AspectClass::Portrait
        );
    }

    #[test]
    fn test_parse_rejects_missing_streams() {
        let err = parse_probe_output(br#"{"format":{}}"#).unwrap_err();
        assert!(matches!(err, ProcessingError::ProbeFailure(_)));
    }

    #[test]
    fn test_parse_rejects_empty_streams() {
        let err = parse_probe_output(br#"{"streams":[]}"#).unwrap_err();
        assert!(err.to_string().contains("No video stream"));
    }

    #[test]
    fn test_parse_rejects_non_numeric_width() {
        let err = parse_probe_output(br#"{"streams":[{"width":"wide","height":1080}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("width"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_probe_output(b"not json").is_err());
        assert!(parse_probe_output(b"").is_err());
    }

    #[test]
    fn test_zero_height_classifies_as_other() {
        let geometry = VideoGeometry {
            width: 1920,
            height: 0,
        };
        assert_eq!(geometry.aspect_class(), AspectClass::Other);
    }

    #[test]
    fn test_new_rejects_unsafe_binary() {
        assert!(FfprobeProber::new("ffprobe; rm -rf /").is_err());
        assert!(FfprobeProber::new("ffprobe").is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_runs_for_paths_with_shell_characters() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("Videos (NAS) & $more");
        std::fs::create_dir(&staging).unwrap();
        let staged = tempfile::NamedTempFile::new_in(&staging).unwrap();

        // `true` exits 0 with empty output, so reaching the parser means the tool ran.
        let prober = FfprobeProber::new("true").unwrap();
        let err = prober.probe(staged.path()).await.unwrap_err();
        assert!(
            err.to_string().contains("Failed to parse ffprobe output"),
            "unexpected error: {}",
            err
        );
    }

    #[tokio::test]
    async fn test_relative_path_rejected() {
        let prober = FfprobeProber::new("ffprobe").unwrap();
        let err = prober.probe(Path::new("-i.mp4")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::ProbeFailure(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_probe_failure() {
        let prober = FfprobeProber::new("/nonexistent/bin/ffprobe").unwrap();
        let staged = tempfile::NamedTempFile::new().unwrap();
        let err = prober.probe(staged.path()).await.unwrap_err();
        assert!(matches!(err, ProcessingError::ProbeFailure(_)));
    }
}
