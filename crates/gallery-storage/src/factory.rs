#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use gallery_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(
                bucket,
                region,
                config.s3_endpoint.clone(),
                config.storage_public_base_url.clone(),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
