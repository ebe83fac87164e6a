//! Tubely Storage Library
//!
//! Object storage gateway used by the upload pipeline: the [`Storage`] trait, the S3
//! implementation, and key derivation.
//!
//! # Storage key format
//!
//! Video keys are `{aspect}/{random}{ext}`, for example
//! `landscape/0c7nJ...Qw.mp4`, where `{aspect}` is one of `landscape`, `portrait` or
//! `other` and `{random}` is 32 random bytes in URL-safe base64 without padding.
//! Keys must not contain `..`, `,` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{extension_from_media_type, generate_video_key};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
