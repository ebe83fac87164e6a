use axum_test::multipart::{MultipartForm, Part};

/// Bytes that look enough like an MP4 for tests; the fakes never decode them.
pub fn create_test_mp4(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size.max(12));
    // ftyp box header
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x18]);
    data.extend_from_slice(b"ftypisom");
    while data.len() < size {
        data.push((data.len() % 251) as u8);
    }
    data
}

/// A single-part form carrying `data` under `field` with the given media type.
pub fn video_form(field: &str, data: Vec<u8>, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(field, video_part(data, mime_type))
}

pub fn video_part(data: Vec<u8>, mime_type: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name("boots-video.mp4")
        .mime_type(mime_type)
}
