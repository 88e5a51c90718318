use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    public_base_url: Option<String>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `public_base_url` - Optional URL prefix objects are served from (e.g. a CDN)
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_base_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            public_base_url,
        })
    }

    /// Public URL for an object
    ///
    /// A configured public base URL wins; otherwise S3-compatible endpoints use
    /// path-style `{endpoint}/{bucket}/{key}` and AWS uses the virtual-hosted form.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref base) = self.public_base_url {
            format!("{}/{}", base.trim_end_matches('/'), key)
        } else if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    fn put_options(content_type: &str, metadata: &ObjectMetadata) -> PutOptions {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        for (name, value) in metadata {
            attributes.insert(Attribute::Metadata(name.clone().into()), value.clone().into());
        }
        PutOptions::from(attributes)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn get(&self, storage_key: &str) -> StorageResult<Option<StoredObject>> {
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = match result {
            Ok(result) => result,
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 object not found"
                );
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                return Err(StorageError::DownloadFailed(e.to_string()));
            }
        };

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());

        let body = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = body.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(Some(StoredObject { body, content_type }))
    }

    async fn put(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(
                &location,
                PutPayload::from(data),
                Self::put_options(content_type, metadata),
            )
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn public_url_for(&self, storage_key: &str) -> String {
        self.generate_url(storage_key)
    }

    fn bucket(&self) -> Option<&str> {
        Some(&self.bucket)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
