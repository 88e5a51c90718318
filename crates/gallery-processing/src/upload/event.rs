//! Storage notification decoding.
//!
//! Batches use the S3 event-notification shape (`{"Records": [...]}`). Each record
//! is decoded on its own so one malformed record cannot sink the rest of the batch.

use gallery_core::{AppError, AppResult};
use percent_encoding::percent_decode_str;
use serde::Deserialize;

/// A batch of raw notification records.
#[derive(Debug, Deserialize)]
pub struct StorageEventBatch {
    #[serde(rename = "Records")]
    pub records: Vec<serde_json::Value>,
}

impl StorageEventBatch {
    /// Parse a batch body. Fails only when the batch itself is malformed.
    pub fn from_slice(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| AppError::InvalidInput(format!("Malformed storage event batch: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct S3EventRecord {
    #[serde(rename = "eventName", default)]
    event_name: Option<String>,
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: S3Bucket,
    object: S3Object,
}

#[derive(Debug, Deserialize)]
struct S3Bucket {
    name: String,
}

#[derive(Debug, Deserialize)]
struct S3Object {
    key: String,
    #[serde(default)]
    size: Option<u64>,
}

/// One object-created notification with its key decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub bucket: String,
    pub key: String,
    pub event_name: Option<String>,
    pub size: Option<u64>,
}

impl UploadEvent {
    /// Build from a bucket and a key as it appears in a notification.
    pub fn new(bucket: impl Into<String>, raw_key: &str) -> Self {
        Self {
            bucket: bucket.into(),
            key: decode_key(raw_key),
            event_name: None,
            size: None,
        }
    }

    pub fn from_record(record: &serde_json::Value) -> AppResult<Self> {
        let record: S3EventRecord = serde_json::from_value(record.clone())
            .map_err(|e| AppError::InvalidInput(format!("Malformed storage event record: {}", e)))?;
        Ok(Self {
            bucket: record.s3.bucket.name,
            key: decode_key(&record.s3.object.key),
            event_name: record.event_name,
            size: record.s3.object.size,
        })
    }
}

/// Notification keys encode spaces as `+` and everything else with percent-escapes.
pub fn decode_key(raw_key: &str) -> String {
    let spaced = raw_key.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
