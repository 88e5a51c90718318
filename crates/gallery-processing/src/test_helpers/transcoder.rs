use bytes::Bytes;
use gallery_core::{AppError, AppResult};
use std::collections::HashSet;

use crate::compression::OutputFormat;
use crate::image::{ImageTranscoder, NativeImageTranscoder};

/// Native transcoder that fails thumbnails of chosen widths.
pub struct FailingTranscoder {
    inner: NativeImageTranscoder,
    failing_widths: HashSet<u32>,
    fail_reencode: bool,
}

impl FailingTranscoder {
    pub fn failing_widths(widths: impl IntoIterator<Item = u32>) -> Self {
        Self {
            inner: NativeImageTranscoder,
            failing_widths: widths.into_iter().collect(),
            fail_reencode: false,
        }
    }

    /// Also fail full-size re-encodes (display copies and avatar originals).
    pub fn failing_reencode(mut self) -> Self {
        self.fail_reencode = true;
        self
    }
}

impl ImageTranscoder for FailingTranscoder {
    fn thumbnail(
        &self,
        source: &[u8],
        width: u32,
        height: u32,
        quality: u8,
        format: OutputFormat,
    ) -> AppResult<Bytes> {
        if self.failing_widths.contains(&width) {
            return Err(AppError::ImageProcessing(format!(
                "injected failure at width {}",
                width
            )));
        }
        self.inner.thumbnail(source, width, height, quality, format)
    }

    fn reencode(&self, source: &[u8], quality: u8, format: OutputFormat) -> AppResult<Bytes> {
        if self.fail_reencode {
            return Err(AppError::ImageProcessing("injected re-encode failure".to_string()));
        }
        self.inner.reencode(source, quality, format)
    }
}
