//! In-memory object store

use async_trait::async_trait;
use bytes::Bytes;
use gallery_storage::{
    ObjectMetadata, Storage, StorageBackend, StorageError, StorageResult, StoredObject,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const PUBLIC_BASE_URL: &str = "https://cdn.example.com";

/// An object as the mock stores it.
#[derive(Debug, Clone)]
pub struct MockObject {
    pub data: Vec<u8>,
    pub content_type: String,
    pub metadata: ObjectMetadata,
}

/// Mock storage that keeps objects in memory and can fail chosen writes
pub struct MockStorage {
    objects: Mutex<HashMap<String, MockObject>>,
    fail_puts: Mutex<Vec<String>>,
    bucket: Option<String>,
    puts: AtomicUsize,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail_puts: Mutex::new(Vec::new()),
            bucket: None,
            puts: AtomicUsize::new(0),
        }
    }

    /// Bind the mock to a bucket so foreign-bucket events are rejected.
    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = Some(bucket.to_string());
        self
    }

    /// Seed an object, as if a client had uploaded it.
    pub fn set_file(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            MockObject {
                data,
                content_type: content_type.unwrap_or_default().to_string(),
                metadata: ObjectMetadata::new(),
            },
        );
    }

    pub fn remove_file(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    /// Make every put whose key contains `pattern` fail.
    pub fn fail_puts_containing(&self, pattern: &str) {
        self.fail_puts.lock().unwrap().push(pattern.to_string());
    }

    pub fn has_file(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.object(key).map(|object| object.data)
    }

    pub fn object(&self, key: &str) -> Option<MockObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of successful puts.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn get(&self, storage_key: &str) -> StorageResult<Option<StoredObject>> {
        Ok(self.object(storage_key).map(|object| StoredObject {
            body: Bytes::from(object.data),
            content_type: Some(object.content_type).filter(|ct| !ct.is_empty()),
        }))
    }

    async fn put(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<String> {
        let failing = self
            .fail_puts
            .lock()
            .unwrap()
            .iter()
            .any(|pattern| storage_key.contains(pattern.as_str()));
        if failing {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for {}",
                storage_key
            )));
        }

        self.objects.lock().unwrap().insert(
            storage_key.to_string(),
            MockObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
                metadata: metadata.clone(),
            },
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(self.public_url_for(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.has_file(storage_key))
    }

    fn public_url_for(&self, storage_key: &str) -> String {
        format!("{}/{}", PUBLIC_BASE_URL, storage_key)
    }

    fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
