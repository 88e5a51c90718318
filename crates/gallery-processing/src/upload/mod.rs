//! Storage notification handling: classification, dispatch and the per-kind processors.

mod album_cover;
mod album_media;
mod avatar;
mod event;
mod outcome;
mod router;
mod services;

pub use album_cover::AlbumCoverService;
pub use album_media::{album_cache_tags, AlbumMediaUploadProcessor};
pub use avatar::AvatarUploadProcessor;
pub use event::{decode_key, StorageEventBatch, UploadEvent};
pub use outcome::{BatchSummary, ProcessOutcome, SkipReason};
pub use router::{UploadEventRouter, UploadKind};
pub use services::{PipelineServices, PipelineSettings};
