//! Common utilities for the upload handler

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use std::io::SeekFrom;
use tempfile::NamedTempFile;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tubely_core::AppError;

/// Normalize a declared media type ("Video/MP4; codecs=avc1" -> "video/mp4").
///
/// Parameters are stripped; the remainder must be a single `type/subtype` pair of token
/// characters.
pub fn normalize_media_type(content_type: &str) -> Result<String, AppError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let malformed = || AppError::BadRequest(format!("Invalid Content-Type: '{}'", content_type));

    let (kind, subtype) = essence.split_once('/').ok_or_else(malformed)?;
    let is_token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    if !is_token(kind) || !is_token(subtype) {
        return Err(malformed());
    }

    Ok(essence)
}

/// Map a multipart read failure. A body over the configured limit is a client error.
pub fn multipart_error(err: MultipartError, max_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BadRequest(upload_too_large_message(max_bytes))
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
    }
}

pub fn upload_too_large_message(max_bytes: usize) -> String {
    format!(
        "Upload exceeds maximum allowed size of {} MB",
        max_bytes / 1024 / 1024
    )
}

/// Stream a multipart field into `staged`, then rewind it.
///
/// Returns the number of bytes written. Bytes are counted as they arrive so an upload
/// cannot exceed `max_bytes` even when the body limit is configured higher.
pub async fn stage_field(
    field: &mut Field<'_>,
    staged: &NamedTempFile,
    max_bytes: usize,
) -> Result<u64, AppError> {
    let mut writer = tokio::fs::File::from_std(staged.as_file().try_clone()?);
    let mut written: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        written += chunk.len() as u64;
        if written > max_bytes as u64 {
            return Err(AppError::BadRequest(upload_too_large_message(max_bytes)));
        }
        writer.write_all(&chunk).await?;
    }

    writer.flush().await?;
    // Shares the file offset with `staged`; readers start at byte 0.
    writer.seek(SeekFrom::Start(0)).await?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::{FromRequest, Multipart};
    use axum::http::Request;
    use std::io::Read;

    const BOUNDARY: &str = "tubely-boundary";

    async fn multipart_with_video(payload: &str) -> Multipart {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"clip.mp4\"\r\n\
             Content-Type: video/mp4\r\n\r\n{payload}\r\n--{b}--\r\n",
            b = BOUNDARY,
            payload = payload
        );
        let request = Request::builder()
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_stage_field_rewinds_to_start() {
        let mut multipart = multipart_with_video("hello world").await;
        let mut field = multipart.next_field().await.unwrap().unwrap();
        let staged = NamedTempFile::new().unwrap();

        let written = stage_field(&mut field, &staged, 1024).await.unwrap();
        assert_eq!(written, 11);

        // Read through the staged handle itself, not by path.
        let mut contents = String::new();
        let mut handle = staged.as_file();
        handle.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello world");
    }

    #[tokio::test]
    async fn test_stage_field_enforces_limit() {
        let mut multipart = multipart_with_video("hello world").await;
        let mut field = multipart.next_field().await.unwrap().unwrap();
        let staged = NamedTempFile::new().unwrap();

        let err = stage_field(&mut field, &staged, 5).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_normalize_strips_parameters_and_case() {
        assert_eq!(normalize_media_type("video/mp4").unwrap(), "video/mp4");
        assert_eq!(
            normalize_media_type(" Video/MP4 ; codecs=\"avc1\"").unwrap(),
            "video/mp4"
        );
        assert_eq!(normalize_media_type("image/png").unwrap(), "image/png");
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        for raw in ["", "mp4", "video/", "/mp4", "video/mp4/extra", "video /mp4", ";"] {
            let err = normalize_media_type(raw).unwrap_err();
            assert!(
                matches!(err, AppError::BadRequest(_)),
                "expected BadRequest for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_too_large_message() {
        assert_eq!(
            upload_too_large_message(1 << 30),
            "Upload exceeds maximum allowed size of 1024 MB"
        );
    }
}
