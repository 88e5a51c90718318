//! Compiled-in thumbnail matrices.

/// One rendition in a thumbnail matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailConfig {
    /// Map key under which the rendition's URL is recorded
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    /// Encoder quality, 1-100
    pub quality: u8,
    /// Appended to the source stem for album-media keys
    pub suffix: &'static str,
}

impl ThumbnailConfig {
    const fn new(name: &'static str, size: u32, quality: u8, suffix: &'static str) -> Self {
        Self {
            name,
            width: size,
            height: size,
            quality,
            suffix,
        }
    }
}

/// Album media and album cover renditions, in primary-fallback order.
pub const ALBUM_THUMBNAILS: [ThumbnailConfig; 5] = [
    ThumbnailConfig::new("small", 240, 80, "_small"),
    ThumbnailConfig::new("cover", 600, 80, "_cover"),
    ThumbnailConfig::new("medium", 480, 85, "_medium"),
    ThumbnailConfig::new("large", 960, 85, "_large"),
    ThumbnailConfig::new("xlarge", 1600, 90, "_xlarge"),
];

pub const AVATAR_THUMBNAILS: [ThumbnailConfig; 3] = [
    ThumbnailConfig::new("small", 64, 85, "_small"),
    ThumbnailConfig::new("medium", 128, 85, "_medium"),
    ThumbnailConfig::new("large", 256, 90, "_large"),
];

/// Name of the preferred primary thumbnail.
pub const PRIMARY_THUMBNAIL: &str = "small";

/// Map entry for the full-size avatar re-encode.
pub const AVATAR_FULL_SIZE_NAME: &str = "original";
pub const AVATAR_FULL_SIZE_QUALITY: u8 = 95;

/// Map entry referencing the display re-encode of an album upload.
pub const ORIGINAL_SIZE_ENTRY: &str = "originalSize";
pub const DISPLAY_SUFFIX: &str = "_display";
pub const DISPLAY_QUALITY: u8 = 92;
