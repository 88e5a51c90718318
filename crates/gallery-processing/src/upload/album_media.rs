use bytes::Bytes;
use gallery_core::thumbnails::{ALBUM_THUMBNAILS, DISPLAY_SUFFIX, ORIGINAL_SIZE_ENTRY};
use gallery_core::{AppResult, MediaRecord, MediaStatus, MediaUpdate};
use gallery_db::MediaMetadataStore;
use gallery_infra::CacheRevalidator;
use gallery_storage::{keys, ObjectMetadata, Storage};
use std::sync::Arc;

use super::outcome::{ProcessOutcome, SkipReason};
use super::services::{PipelineServices, PipelineSettings};
use crate::normalizer::FormatNormalizer;
use crate::thumbnail::{primary_thumbnail, ThumbnailGenerator, ThumbnailTarget};

/// Cache tags a change to an album's media invalidates.
pub fn album_cache_tags(album_id: &str) -> Vec<String> {
    vec!["albums".to_string(), format!("album-{}", album_id)]
}

/// Handles `albums/{albumId}/media/{filename}` uploads.
///
/// Once a matching record is found it always ends up `uploaded`, whatever happened
/// to thumbnail generation.
pub struct AlbumMediaUploadProcessor {
    storage: Arc<dyn Storage>,
    store: Arc<dyn MediaMetadataStore>,
    revalidator: Arc<dyn CacheRevalidator>,
    generator: ThumbnailGenerator,
    normalizer: FormatNormalizer,
    settings: PipelineSettings,
}

impl AlbumMediaUploadProcessor {
    pub fn new(services: &PipelineServices) -> Self {
        Self {
            storage: Arc::clone(&services.storage),
            store: Arc::clone(&services.store),
            revalidator: Arc::clone(&services.revalidator),
            generator: services.thumbnail_generator(),
            normalizer: services.format_normalizer(),
            settings: services.settings,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn process(&self, key: &str, album_id: &str) -> AppResult<ProcessOutcome> {
        if album_id.is_empty() {
            tracing::info!(key = %key, "Album media key is missing the album id; skipping");
            return Ok(ProcessOutcome::Skipped(SkipReason::MissingPathSegment));
        }

        let Some(media) = self
            .store
            .find_media_by_storage_key(album_id, key, self.settings.media_lookup_page_size)
            .await?
        else {
            tracing::info!(
                album_id = %album_id,
                key = %key,
                "No media record for uploaded object; skipping"
            );
            return Ok(ProcessOutcome::Skipped(SkipReason::NoMatchingRecord));
        };

        if media.status == MediaStatus::Uploaded && !media.thumbnails.is_empty() {
            tracing::debug!(
                media_id = %media.id,
                key = %key,
                "Media already processed; treating event as a redelivery"
            );
        }

        let Some(object) = self.storage.get(key).await? else {
            tracing::info!(
                media_id = %media.id,
                key = %key,
                "Uploaded object no longer exists; skipping"
            );
            return Ok(ProcessOutcome::Skipped(SkipReason::ObjectNotFound));
        };

        let content_type = object
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| media.mime_type.clone());

        let update = match self.render(&media, object.body, &content_type).await {
            Ok(update) => update,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    media_id = %media.id,
                    key = %key,
                    "Thumbnail generation failed; marking media uploaded without thumbnails"
                );
                MediaUpdate::uploaded()
            }
        };

        if let Err(e) = self.store.update_media(&media.id, &update).await {
            tracing::error!(
                error = %e,
                media_id = %media.id,
                album_id = %album_id,
                "Failed to update media record"
            );
            return Err(e);
        }

        tracing::info!(
            media_id = %media.id,
            album_id = %album_id,
            thumbnails = update.thumbnails.len(),
            has_display = update.display_url.is_some(),
            "Album media processed"
        );

        self.revalidator
            .revalidate(&album_cache_tags(album_id))
            .await;

        Ok(ProcessOutcome::Processed)
    }

    /// Build the media update for an upload. Non-image uploads get a status-only update.
    async fn render(
        &self,
        media: &MediaRecord,
        source: Bytes,
        content_type: &str,
    ) -> AppResult<MediaUpdate> {
        let target = ThumbnailTarget::AlbumMedia {
            source_key: media.storage_key.clone(),
        };
        if !ThumbnailGenerator::supports(content_type, &target) {
            tracing::debug!(
                media_id = %media.id,
                content_type = %content_type,
                "Not an image; skipping thumbnail generation"
            );
            return Ok(MediaUpdate::uploaded());
        }

        let mut thumbnails = self
            .generator
            .generate(source.clone(), content_type, &target, &ALBUM_THUMBNAILS)
            .await?;
        let primary = primary_thumbnail(&thumbnails, &ALBUM_THUMBNAILS);

        let display_url = if self.normalizer.should_convert(content_type) {
            match self.upload_display_copy(&media.storage_key, source).await {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        media_id = %media.id,
                        key = %media.storage_key,
                        "Display copy failed; keeping thumbnails"
                    );
                    None
                }
            }
        } else {
            None
        };

        let update = MediaUpdate::uploaded().with_display_url(display_url.clone());
        match primary {
            Some(primary) => {
                if let Some(url) = display_url {
                    thumbnails.insert(ORIGINAL_SIZE_ENTRY.to_string(), url);
                }
                Ok(update.with_thumbnails(primary, thumbnails))
            }
            None => {
                tracing::warn!(
                    media_id = %media.id,
                    key = %media.storage_key,
                    "No thumbnails were produced"
                );
                Ok(update)
            }
        }
    }

    async fn upload_display_copy(&self, source_key: &str, source: Bytes) -> AppResult<String> {
        let format = self.normalizer.output_format();
        let display_key = keys::sibling_key(source_key, DISPLAY_SUFFIX, format.extension());
        let encoded = self.normalizer.convert(source).await?;

        let mut metadata = ObjectMetadata::new();
        metadata.insert("size".to_string(), ORIGINAL_SIZE_ENTRY.to_string());
        metadata.insert("source-key".to_string(), source_key.to_string());

        let url = self
            .storage
            .put(&display_key, encoded, format.to_mime_type(), &metadata)
            .await?;
        tracing::debug!(key = %display_key, "Display copy uploaded");
        Ok(url)
    }
}
