//! Stored video reference: the `{bucket, key}` locator persisted instead of a URL.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::AppError;

const REFERENCE_DELIMITER: char = ',';

/// Location of an uploaded video in object storage.
///
/// Persisted as a single `bucket,key` string and expanded into a presigned URL only when
/// the video is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredVideoReference {
    pub bucket: String,
    pub key: String,
}

impl StoredVideoReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Encode as `bucket,key` for the `video_url` column.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.bucket, REFERENCE_DELIMITER, self.key)
    }

    /// Decode a persisted reference.
    ///
    /// Exactly two non-empty parts are required; anything else means the row was written
    /// by something other than the upload pipeline.
    pub fn decode(encoded: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = encoded.split(REFERENCE_DELIMITER).collect();
        match parts.as_slice() {
            [bucket, key] if !bucket.is_empty() && !key.is_empty() => {
                Ok(Self::new(*bucket, *key))
            }
            _ => Err(AppError::DataIntegrity(format!(
                "malformed stored video reference: {:?}",
                encoded
            ))),
        }
    }
}

impl Display for StoredVideoReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.encode())
    }
}

impl FromStr for StoredVideoReference {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let reference = StoredVideoReference::new("b", "k");
        assert_eq!(reference.encode(), "b,k");
        assert_eq!(StoredVideoReference::decode("b,k").unwrap(), reference);
    }

    #[test]
    fn test_round_trip_realistic_key() {
        let reference = StoredVideoReference::new(
            "tubely-videos",
            "landscape/x8Uq2Lr0jm_fJ1N3s2bV0cTqk9yH5aZp-WuQeRmD4oE.mp4",
        );
        let decoded: StoredVideoReference = reference.encode().parse().unwrap();
        assert_eq!(decoded, reference);
    }

    #[test]
    fn test_decode_rejects_missing_delimiter() {
        let err = StoredVideoReference::decode("bucket-only").unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[test]
    fn test_decode_rejects_extra_delimiters() {
        assert!(StoredVideoReference::decode("b,k,extra").is_err());
        assert!(StoredVideoReference::decode(",,").is_err());
    }

    #[test]
    fn test_decode_rejects_empty_parts() {
        assert!(StoredVideoReference::decode("").is_err());
        assert!(StoredVideoReference::decode(",k").is_err());
        assert!(StoredVideoReference::decode("b,").is_err());
    }

    #[test]
    fn test_decode_rejects_legacy_urls() {
        // rows written before the reference layout stored a plain URL
        assert!(
            StoredVideoReference::decode("https://tubely.s3.us-east-1.amazonaws.com/a.mp4")
                .is_err()
        );
    }
}
