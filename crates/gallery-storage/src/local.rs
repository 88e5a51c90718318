use crate::traits::{validate_key, ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

const SIDECAR_EXTENSION: &str = "meta.json";

/// Content type and user metadata persisted next to each object.
#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    content_type: String,
    #[serde(default)]
    metadata: ObjectMetadata,
}

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/gallery/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4100/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;
        Ok(self.base_path.join(storage_key))
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(SIDECAR_EXTENSION);
        PathBuf::from(name)
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn read_sidecar(path: &Path) -> Option<Sidecar> {
        let raw = fs::read(Self::sidecar_path(path)).await.ok()?;
        match serde_json::from_slice(&raw) {
            Ok(sidecar) => Some(sidecar),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Ignoring unreadable object sidecar"
                );
                None
            }
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn get(&self, storage_key: &str) -> StorageResult<Option<StoredObject>> {
        let path = self.key_to_path(storage_key)?;

        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key = %storage_key, "Local object not found");
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    key = %storage_key,
                    "Local storage read failed"
                );
                return Err(StorageError::DownloadFailed(e.to_string()));
            }
        };

        let content_type = Self::read_sidecar(&path).await.map(|s| s.content_type);

        tracing::debug!(
            key = %storage_key,
            size_bytes = body.len() as u64,
            "Local storage read successful"
        );

        Ok(Some(StoredObject {
            body: Bytes::from(body),
            content_type,
        }))
    }

    async fn put(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let size = data.len() as u64;
        fs::write(&path, &data).await.map_err(|e| {
            tracing::error!(
                error = %e,
                key = %storage_key,
                size_bytes = size,
                "Local storage write failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let sidecar = Sidecar {
            content_type: content_type.to_string(),
            metadata: metadata.clone(),
        };
        let raw = serde_json::to_vec(&sidecar)
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        fs::write(Self::sidecar_path(&path), raw).await?;

        tracing::debug!(
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            "Local storage write successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::DeleteFailed(e.to_string())),
        }
        // A missing sidecar is fine.
        let _ = fs::remove_file(Self::sidecar_path(&path)).await;

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url_for(&self, storage_key: &str) -> String {
        self.generate_url(storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage(dir: &TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), "http://localhost:4100/media/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn put_then_get_preserves_content_type() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;

        let mut metadata = ObjectMetadata::new();
        metadata.insert("size".to_string(), "small".to_string());

        let url = storage
            .put(
                "albums/a1/media/thumbnails/photo_small.webp",
                Bytes::from_static(b"webp-bytes"),
                "image/webp",
                &metadata,
            )
            .await
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:4100/media/albums/a1/media/thumbnails/photo_small.webp"
        );

        let object = storage
            .get("albums/a1/media/thumbnails/photo_small.webp")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&object.body[..], b"webp-bytes");
        assert_eq!(object.content_type.as_deref(), Some("image/webp"));
    }

    #[tokio::test]
    async fn missing_object_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;

        assert!(storage.get("albums/a1/media/missing.png").await.unwrap().is_none());
        assert!(!storage.exists("albums/a1/media/missing.png").await.unwrap());
    }

    #[tokio::test]
    async fn object_without_sidecar_has_no_content_type() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let path = dir.path().join("users/u1/avatar/me.png");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"raw").unwrap();

        let object = storage.get("users/u1/avatar/me.png").await.unwrap().unwrap();
        assert!(object.content_type.is_none());
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        storage
            .put("a/b.txt", Bytes::from_static(b"x"), "text/plain", &ObjectMetadata::new())
            .await
            .unwrap();

        assert!(storage.exists("a/b.txt").await.unwrap());
        storage.delete("a/b.txt").await.unwrap();
        assert!(!storage.exists("a/b.txt").await.unwrap());
        storage.delete("a/b.txt").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let err = storage.get("../outside.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn double_dots_inside_a_file_name_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        storage
            .put(
                "albums/abc123/media/wow..jpg",
                Bytes::from_static(b"jpeg"),
                "image/jpeg",
                &ObjectMetadata::new(),
            )
            .await
            .unwrap();

        let object = storage.get("albums/abc123/media/wow..jpg").await.unwrap().unwrap();
        assert_eq!(&object.body[..], b"jpeg");
        assert_eq!(object.content_type.as_deref(), Some("image/jpeg"));
    }
}
