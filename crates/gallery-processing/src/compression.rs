use bytes::Bytes;
use gallery_core::{AppError, AppResult};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Largest width or height libwebp can encode.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Output format for rendered images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    WebP,
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.to_lowercase().as_str() {
            "webp" => Ok(OutputFormat::WebP),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(AppError::InvalidInput(format!("Invalid format: {}", s))),
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Encode an image at the given quality (1-100). PNG ignores quality.
pub fn encode(img: &DynamicImage, format: OutputFormat, quality: u8) -> AppResult<Bytes> {
    let quality = quality.clamp(1, 100);
    match format {
        OutputFormat::WebP => compress_webp(img, quality),
        OutputFormat::Jpeg => compress_jpeg(img, quality),
        OutputFormat::Png => compress_png(img),
    }
}

fn compress_webp(img: &DynamicImage, quality: u8) -> AppResult<Bytes> {
    let (width, height) = img.dimensions();
    if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
        return Err(AppError::ImageProcessing(format!(
            "{}x{} exceeds the WebP dimension limit",
            width, height
        )));
    }

    let rgba_img = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    let webp_data = encoder
        .encode_simple(false, quality as f32)
        .map_err(|e| AppError::ImageProcessing(format!("WebP encoding failed: {:?}", e)))?;

    Ok(Bytes::copy_from_slice(&webp_data))
}

fn compress_jpeg(img: &DynamicImage, quality: u8) -> AppResult<Bytes> {
    let rgb_img = img.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb_img)
        .map_err(|e| AppError::ImageProcessing(format!("JPEG encoding failed: {}", e)))?;
    Ok(Bytes::from(buffer))
}

fn compress_png(img: &DynamicImage) -> AppResult<Bytes> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| AppError::ImageProcessing(format!("PNG encoding failed: {}", e)))?;
    Ok(Bytes::from(buffer))
}
