use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;

use crate::StorageBackend;

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for gallery_core::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => gallery_core::AppError::Configuration(msg),
            other => gallery_core::AppError::Storage(other.to_string()),
        }
    }
}

/// User-defined metadata stored alongside an object.
pub type ObjectMetadata = BTreeMap<String, String>;

/// An object fetched from the store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    /// Declared content type, when the store recorded one
    pub content_type: Option<String>,
}

/// Object store seen by the pipeline.
///
/// An absent object is `Ok(None)` from [`Storage::get`], not an error: storage
/// notifications can outlive the object they describe.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch an object's bytes and declared content type.
    async fn get(&self, storage_key: &str) -> StorageResult<Option<StoredObject>>;

    /// Write an object under an explicit key and return its public URL.
    async fn put(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<String>;

    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Public URL an object is (or will be) served from.
    fn public_url_for(&self, storage_key: &str) -> String;

    /// Bucket this store is bound to, for backends that have one.
    fn bucket(&self) -> Option<&str> {
        None
    }

    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape a filesystem-backed store's root.
///
/// Only whole `..` segments count as traversal; `wow..jpg` is a valid name.
pub(crate) fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.starts_with('/') || storage_key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
