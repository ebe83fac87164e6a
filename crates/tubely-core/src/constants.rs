//! Constants shared across crates.

/// Media type accepted by the upload pipeline unless overridden by configuration.
pub const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Upload ceiling applied when `MAX_UPLOAD_SIZE_MB` is unset (1 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1 << 30;

/// Uploads processed at once when `MAX_CONCURRENT_UPLOADS` is unset.
///
/// Each in-flight upload may hold its remuxed file in memory while it is put.
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 4;

/// Lifetime of presigned read URLs when `PRESIGN_TTL_SECONDS` is unset.
pub const DEFAULT_PRESIGN_TTL_SECS: u64 = 300;

/// Name of the multipart field carrying the video file.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Suffix appended to a staged file's path for the fast-start output.
pub const REMUX_OUTPUT_SUFFIX: &str = ".processing";
