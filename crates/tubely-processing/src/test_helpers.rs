//! In-process stand-ins for the `ffprobe`/`ffmpeg` wrappers.
//!
//! Enabled for this crate's tests and, through the `test-helpers` feature, for the
//! tests of crates that drive the upload pipeline.

use crate::error::{ProcessingError, ProcessingResult};
use crate::video::remuxer::remux_output_path;
use crate::video::{MediaProber, Remuxer, VideoGeometry};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempPath;

/// Prober returning fixed dimensions, or failing.
pub struct FakeProber {
    result: Result<VideoGeometry, String>,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn with_dimensions(width: u64, height: u64) -> Self {
        Self {
            result: Ok(VideoGeometry { width, height }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn landscape() -> Self {
        Self::with_dimensions(1920, 1080)
    }

    pub fn portrait() -> Self {
        Self::with_dimensions(1080, 1920)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, _path: &Path) -> ProcessingResult<VideoGeometry> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .map_err(ProcessingError::ProbeFailure)
    }
}

/// Remuxer that copies its input to the usual `.processing` path, or fails.
///
/// Every input path it is handed is recorded so tests can assert the staged file was
/// cleaned up afterwards.
pub struct FakeRemuxer {
    failure: Option<String>,
    delay: Option<Duration>,
    inputs: Mutex<Vec<PathBuf>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeRemuxer {
    fn new(failure: Option<String>) -> Self {
        Self {
            failure,
            delay: None,
            inputs: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn copying() -> Self {
        Self::new(None)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Some(message.into()))
    }

    /// Hold every remux open for `delay`, so overlapping uploads can be observed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Highest number of remuxes that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<PathBuf> {
        self.inputs.lock().map(|i| i.clone()).unwrap_or_default()
    }

    /// Output paths the remuxer produced (or would have produced).
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.inputs()
            .iter()
            .map(|input| remux_output_path(input))
            .collect()
    }
}

#[async_trait]
impl Remuxer for FakeRemuxer {
    async fn remux(&self, input: &Path) -> ProcessingResult<TempPath> {
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(input.to_path_buf());
        }

        let output = TempPath::from_path(remux_output_path(input));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(ref message) = self.failure {
            return Err(ProcessingError::RemuxFailure(message.clone()));
        }

        tokio::fs::copy(input, &*output)
            .await
            .map_err(|e| ProcessingError::RemuxFailure(e.to_string()))?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::models::AspectClass;

    #[tokio::test]
    async fn test_fake_prober_classifies() {
        let prober = FakeProber::portrait();
        let class = prober.classify(Path::new("/tmp/unused")).await.unwrap();
        assert_eq!(class, AspectClass::Portrait);
        assert_eq!(prober.calls(), 1);
    }

    #[tokio::test]
    async fn test_fake_remuxer_copies_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("staged");
        std::fs::write(&input, b"mp4 bytes").unwrap();

        let remuxer = FakeRemuxer::copying();
        let output = remuxer.remux(&input).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"mp4 bytes");

        let output_path = output.to_path_buf();
        drop(output);
        assert!(!output_path.exists());
        assert_eq!(remuxer.outputs(), vec![output_path]);
    }

    #[tokio::test]
    async fn test_fake_remuxer_tracks_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        std::fs::write(&first, b"a").unwrap();
        std::fs::write(&second, b"b").unwrap();

        let remuxer = FakeRemuxer::copying().with_delay(Duration::from_millis(20));
        let (a, b) = tokio::join!(remuxer.remux(&first), remuxer.remux(&second));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(remuxer.peak_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_fake_remuxer_failure() {
        let remuxer = FakeRemuxer::failing("exit status: 1");
        let err = remuxer.remux(Path::new("/tmp/x")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::RemuxFailure(_)));
    }
}
