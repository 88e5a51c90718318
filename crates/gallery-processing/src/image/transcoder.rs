use bytes::Bytes;
use gallery_core::{AppError, AppResult};
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use super::resize::ImageResize;
use crate::compression::{self, OutputFormat};

/// Stateless decode/resize/encode seam.
///
/// Implementations are CPU-bound and synchronous; async callers run them on the
/// blocking pool.
pub trait ImageTranscoder: Send + Sync {
    /// Cover-fit `source` to exactly `width`x`height` and encode it.
    fn thumbnail(
        &self,
        source: &[u8],
        width: u32,
        height: u32,
        quality: u8,
        format: OutputFormat,
    ) -> AppResult<Bytes>;

    /// Re-encode `source` at its original dimensions.
    fn reencode(&self, source: &[u8], quality: u8, format: OutputFormat) -> AppResult<Bytes>;
}

/// Decode any format the `image` crate recognises by content sniffing.
pub fn decode(data: &[u8]) -> AppResult<DynamicImage> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::ImageProcessing(format!("Failed to read image: {}", e)))?
        .decode()
        .map_err(|e| AppError::ImageProcessing(format!("Failed to decode image: {}", e)))
}

/// Transcoder backed by the `image` and `webp` crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeImageTranscoder;

impl ImageTranscoder for NativeImageTranscoder {
    fn thumbnail(
        &self,
        source: &[u8],
        width: u32,
        height: u32,
        quality: u8,
        format: OutputFormat,
    ) -> AppResult<Bytes> {
        if width == 0 || height == 0 {
            return Err(AppError::InvalidInput(format!(
                "Invalid thumbnail size {}x{}",
                width, height
            )));
        }
        let img = decode(source)?;
        let resized = ImageResize::cover(&img, width, height);
        compression::encode(&resized, format, quality)
    }

    fn reencode(&self, source: &[u8], quality: u8, format: OutputFormat) -> AppResult<Bytes> {
        let img = decode(source)?;
        compression::encode(&img, format, quality)
    }
}
