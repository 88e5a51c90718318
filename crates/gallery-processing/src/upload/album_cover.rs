use gallery_core::thumbnails::ALBUM_THUMBNAILS;
use gallery_core::{AlbumCoverUpdate, AppError, AppResult, ThumbnailMap};
use gallery_db::MediaMetadataStore;
use gallery_infra::CacheRevalidator;
use gallery_storage::Storage;
use std::sync::Arc;

use super::album_media::album_cache_tags;
use super::services::PipelineServices;
use crate::thumbnail::{primary_thumbnail, ThumbnailGenerator, ThumbnailTarget};

/// Renders an album's cover matrix from one of its uploaded objects.
///
/// Not driven by storage notifications: callers invoke it when a cover is chosen.
pub struct AlbumCoverService {
    storage: Arc<dyn Storage>,
    store: Arc<dyn MediaMetadataStore>,
    revalidator: Arc<dyn CacheRevalidator>,
    generator: ThumbnailGenerator,
}

impl AlbumCoverService {
    pub fn new(services: &PipelineServices) -> Self {
        Self {
            storage: Arc::clone(&services.storage),
            store: Arc::clone(&services.store),
            revalidator: Arc::clone(&services.revalidator),
            generator: services.thumbnail_generator(),
        }
    }

    /// Generate cover thumbnails for `album_id` from `source_key` and store them on the album.
    #[tracing::instrument(skip(self))]
    pub async fn generate(&self, album_id: &str, source_key: &str) -> AppResult<ThumbnailMap> {
        let object = self
            .storage
            .get(source_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cover source {} not found", source_key)))?;
        let content_type = object.content_type.unwrap_or_default();

        let target = ThumbnailTarget::AlbumCover {
            album_id: album_id.to_string(),
        };
        let thumbnails = self
            .generator
            .generate(object.body, &content_type, &target, &ALBUM_THUMBNAILS)
            .await?;

        if thumbnails.is_empty() {
            tracing::warn!(album_id = %album_id, key = %source_key, "No cover thumbnails were produced");
            return Ok(thumbnails);
        }

        let cover_url = primary_thumbnail(&thumbnails, &ALBUM_THUMBNAILS);
        self.store
            .update_album(album_id, &AlbumCoverUpdate::new(cover_url, thumbnails.clone()))
            .await?;

        tracing::info!(
            album_id = %album_id,
            thumbnails = thumbnails.len(),
            "Album cover thumbnails stored"
        );

        self.revalidator.revalidate(&album_cache_tags(album_id)).await;
        Ok(thumbnails)
    }
}
