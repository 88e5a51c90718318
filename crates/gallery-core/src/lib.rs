//! Gallery Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! compiled-in thumbnail matrix shared by every Gallery pipeline component.

pub mod config;
pub mod error;
pub mod media_types;
pub mod models;
pub mod storage_types;
pub mod thumbnails;

// Re-export commonly used types
pub use config::{Config, LogFormat, MetadataBackend};
pub use error::{AppError, AppResult, ErrorMetadata, LogLevel};
pub use models::{
    AlbumCoverUpdate, AlbumRecord, AvatarUpdate, MediaPage, MediaRecord, MediaStatus,
    MediaUpdate, ThumbnailMap, UserRecord,
};
pub use storage_types::StorageBackend;
pub use thumbnails::ThumbnailConfig;
