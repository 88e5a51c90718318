use gallery_core::AppResult;
use gallery_storage::{keys, Storage};
use std::sync::Arc;
use std::time::Instant;

use super::album_media::AlbumMediaUploadProcessor;
use super::avatar::AvatarUploadProcessor;
use super::event::{StorageEventBatch, UploadEvent};
use super::outcome::{BatchSummary, ProcessOutcome, SkipReason};
use super::services::PipelineServices;

/// What an uploaded object key refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadKind {
    /// A rendition this pipeline wrote itself
    ThumbnailEcho,
    /// `users/{userId}/avatar/{filename}`
    Avatar { user_id: String, filename: String },
    /// `albums/{albumId}/media/{filename}`
    AlbumMedia { album_id: String, filename: String },
    Unrecognized,
}

impl UploadKind {
    /// Classify a decoded object key.
    pub fn classify(key: &str) -> Self {
        if keys::is_thumbnail_key(key) {
            return UploadKind::ThumbnailEcho;
        }

        let segments: Vec<&str> = key.split('/').collect();
        if segments.len() < 4 {
            return UploadKind::Unrecognized;
        }
        let filename = segments[segments.len() - 1].to_string();

        match (segments[0], segments[2]) {
            ("users", "avatar") => UploadKind::Avatar {
                user_id: segments[1].to_string(),
                filename,
            },
            ("albums", "media") => UploadKind::AlbumMedia {
                album_id: segments[1].to_string(),
                filename,
            },
            _ => UploadKind::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::ThumbnailEcho => "thumbnail-echo",
            UploadKind::Avatar { .. } => "avatar-upload",
            UploadKind::AlbumMedia { .. } => "album-media-upload",
            UploadKind::Unrecognized => "unrecognized",
        }
    }
}

/// Entry point for storage notifications.
pub struct UploadEventRouter {
    storage: Arc<dyn Storage>,
    avatar: AvatarUploadProcessor,
    album_media: AlbumMediaUploadProcessor,
}

impl UploadEventRouter {
    pub fn new(services: &PipelineServices) -> Self {
        Self {
            storage: Arc::clone(&services.storage),
            avatar: AvatarUploadProcessor::new(services),
            album_media: AlbumMediaUploadProcessor::new(services),
        }
    }

    /// Process every record in order. A failing record is logged and counted; it
    /// never stops the records after it.
    pub async fn handle_batch(&self, batch: &StorageEventBatch) -> BatchSummary {
        let start = Instant::now();
        let mut summary = BatchSummary::default();

        for (index, record) in batch.records.iter().enumerate() {
            let event = match UploadEvent::from_record(record) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, index, "Skipping malformed storage event record");
                    summary.failed += 1;
                    continue;
                }
            };

            match self.handle_event(&event).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        error_type = e.error_type(),
                        bucket = %event.bucket,
                        key = %event.key,
                        "Failed to process storage event"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            records = batch.len(),
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Storage event batch handled"
        );

        summary
    }

    #[tracing::instrument(skip(self, event), fields(bucket = %event.bucket, key = %event.key))]
    pub async fn handle_event(&self, event: &UploadEvent) -> AppResult<ProcessOutcome> {
        if let Some(bucket) = self.storage.bucket() {
            if bucket != event.bucket {
                tracing::warn!(
                    expected = %bucket,
                    "Event names a bucket this worker does not serve; skipping"
                );
                return Ok(ProcessOutcome::Skipped(SkipReason::ForeignBucket));
            }
        }

        let kind = UploadKind::classify(&event.key);
        tracing::debug!(kind = kind.as_str(), "Classified upload");

        match kind {
            UploadKind::ThumbnailEcho => {
                tracing::debug!("Ignoring thumbnail written by the pipeline");
                Ok(ProcessOutcome::Skipped(SkipReason::ThumbnailEcho))
            }
            UploadKind::Avatar { user_id, filename } => {
                self.avatar.process(&event.key, &user_id, &filename).await
            }
            UploadKind::AlbumMedia { album_id, .. } => {
                self.album_media.process(&event.key, &album_id).await
            }
            UploadKind::Unrecognized => {
                tracing::info!("Unrecognized upload key; nothing to do");
                Ok(ProcessOutcome::Skipped(SkipReason::UnrecognizedKey))
            }
        }
    }
}
