//! Tubely Media Processing Library
//!
//! Wrappers around the external `ffprobe` and `ffmpeg` binaries used by the upload
//! pipeline: aspect classification of a staged upload and the fast-start remux.

pub mod error;
pub mod video;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used types
pub use error::{ProcessingError, ProcessingResult};
pub use video::{FfmpegRemuxer, FfprobeProber, MediaProber, Remuxer, VideoGeometry};
