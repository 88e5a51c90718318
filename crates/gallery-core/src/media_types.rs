//! MIME type sets recognised by the pipeline.
//!
//! Content types arrive from object metadata and from media records, so they are
//! normalised (lowercased, parameters stripped) before any membership check.

/// Types the avatar variant of the thumbnail generator accepts.
pub const AVATAR_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Types the album variants of the thumbnail generator accept.
pub const ALBUM_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Types that additionally get a web-optimised display re-encode.
pub const DISPLAY_CONVERTIBLE_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Content type of every rendition the pipeline writes.
pub const WEB_OUTPUT_CONTENT_TYPE: &str = "image/webp";

/// File extension matching [`WEB_OUTPUT_CONTENT_TYPE`].
pub const WEB_OUTPUT_EXTENSION: &str = "webp";

/// Lowercase a content type and drop any `; charset=...` style parameters.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn is_one_of(content_type: &str, set: &[&str]) -> bool {
    let normalized = normalize_content_type(content_type);
    set.iter().any(|t| *t == normalized)
}
