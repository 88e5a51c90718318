//! Gallery upload processing
//!
//! Turns storage notifications into thumbnails, display re-encodes and metadata
//! updates:
//!
//! - [`upload::UploadEventRouter`] classifies each notification and dispatches it
//! - [`thumbnail::ThumbnailGenerator`] renders and uploads a size matrix
//! - [`normalizer::FormatNormalizer`] produces the web-optimised display copy
//! - [`image::ImageTranscoder`] is the decode/resize/encode seam

pub mod compression;
pub mod image;
pub mod normalizer;
pub mod thumbnail;
pub mod upload;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used types
pub use compression::OutputFormat;
pub use image::{ImageResize, ImageTranscoder, NativeImageTranscoder};
pub use normalizer::FormatNormalizer;
pub use thumbnail::{ThumbnailGenerator, ThumbnailTarget};
pub use upload::{
    AlbumCoverService, AlbumMediaUploadProcessor, AvatarUploadProcessor, BatchSummary,
    PipelineServices, PipelineSettings, ProcessOutcome, SkipReason, StorageEventBatch,
    UploadEvent, UploadEventRouter, UploadKind,
};
