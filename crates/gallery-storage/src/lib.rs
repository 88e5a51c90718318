//! Gallery Storage Library
//!
//! Object store abstraction for the upload pipeline: the `Storage` trait plus S3
//! (via object_store) and local filesystem implementations.
//!
//! # Storage key format
//!
//! - **Album media**: `albums/{albumId}/media/{filename}`
//! - **Album media thumbnails**: `albums/{albumId}/media/thumbnails/{stem}{suffix}.{ext}`
//! - **Album cover thumbnails**: `albums/{albumId}/cover/thumbnails/{size}.{ext}`
//! - **Avatars**: `users/{userId}/avatar/{filename}`
//! - **Avatar thumbnails**: `users/{userId}/avatar/thumbnails/{size}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Derived keys are built in the
//! `keys` module so every backend and processor agrees on the layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use gallery_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
