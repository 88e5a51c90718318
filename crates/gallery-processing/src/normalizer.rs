use bytes::Bytes;
use gallery_core::media_types::{is_one_of, normalize_content_type, DISPLAY_CONVERTIBLE_TYPES};
use gallery_core::thumbnails::DISPLAY_QUALITY;
use gallery_core::{AppError, AppResult};
use std::sync::Arc;

use crate::compression::OutputFormat;
use crate::image::ImageTranscoder;

/// Produces the web-optimised display copy of an album upload.
///
/// Key derivation belongs to the caller.
pub struct FormatNormalizer {
    transcoder: Arc<dyn ImageTranscoder>,
    format: OutputFormat,
    quality: u8,
}

impl FormatNormalizer {
    pub fn new(transcoder: Arc<dyn ImageTranscoder>) -> Self {
        Self {
            transcoder,
            format: OutputFormat::WebP,
            quality: DISPLAY_QUALITY,
        }
    }

    /// Whether an upload of this type gets a display re-encode.
    pub fn should_convert(&self, content_type: &str) -> bool {
        is_one_of(content_type, DISPLAY_CONVERTIBLE_TYPES)
            && normalize_content_type(content_type) != self.format.to_mime_type()
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    pub async fn convert(&self, source: Bytes) -> AppResult<Bytes> {
        let transcoder = Arc::clone(&self.transcoder);
        let (format, quality) = (self.format, self.quality);
        tokio::task::spawn_blocking(move || transcoder.reencode(&source, quality, format))
            .await
            .map_err(|e| AppError::Internal(format!("Display conversion task failed: {}", e)))?
    }
}
