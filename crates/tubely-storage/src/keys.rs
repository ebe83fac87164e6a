//! Key generation for uploaded videos.
//!
//! Keys are intentionally unpredictable so stored objects cannot be enumerated.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tubely_core::models::AspectClass;

const RANDOM_KEY_BYTES: usize = 32;
const FALLBACK_EXTENSION: &str = ".bin";

/// Generate a storage key of the form `{aspect}/{random}{ext}`.
pub fn generate_video_key(aspect: AspectClass, media_type: &str) -> String {
    format!(
        "{}/{}{}",
        aspect.prefix(),
        random_filename_stem(),
        extension_from_media_type(media_type)
    )
}

/// 32 bytes from the thread-local CSPRNG, URL-safe base64 without padding.
fn random_filename_stem() -> String {
    let mut bytes = [0u8; RANDOM_KEY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// File extension for a media type: `video/mp4` gives `.mp4`.
///
/// Anything that is not exactly `type/subtype` (after dropping parameters) falls back to
/// `.bin`; extension derivation never fails an upload.
pub fn extension_from_media_type(media_type: &str) -> String {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    let parts: Vec<&str> = essence.split('/').collect();
    match parts.as_slice() {
        [kind, subtype]
            if !kind.is_empty()
                && !subtype.is_empty()
                && !subtype.starts_with('.')
                && subtype
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.')) =>
        {
            format!(".{}", subtype.to_ascii_lowercase())
        }
        _ => FALLBACK_EXTENSION.to_string(),
    }
}
