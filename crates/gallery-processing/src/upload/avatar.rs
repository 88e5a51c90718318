use gallery_core::{AppResult, AvatarUpdate};
use gallery_db::MediaMetadataStore;
use gallery_storage::Storage;
use std::sync::Arc;

use super::outcome::{ProcessOutcome, SkipReason};
use super::services::PipelineServices;
use crate::thumbnail::ThumbnailGenerator;
use gallery_core::thumbnails::AVATAR_FULL_SIZE_NAME;

/// Handles `users/{userId}/avatar/{filename}` uploads.
///
/// There is no fallback write: if generation or the user update fails, the user's
/// avatar fields are left untouched and the error propagates.
pub struct AvatarUploadProcessor {
    storage: Arc<dyn Storage>,
    store: Arc<dyn MediaMetadataStore>,
    generator: ThumbnailGenerator,
}

impl AvatarUploadProcessor {
    pub fn new(services: &PipelineServices) -> Self {
        Self {
            storage: Arc::clone(&services.storage),
            store: Arc::clone(&services.store),
            generator: services.thumbnail_generator(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn process(
        &self,
        key: &str,
        user_id: &str,
        filename: &str,
    ) -> AppResult<ProcessOutcome> {
        if user_id.is_empty() || filename.is_empty() {
            tracing::info!(key = %key, "Avatar key is missing the user id or filename; skipping");
            return Ok(ProcessOutcome::Skipped(SkipReason::MissingPathSegment));
        }

        let Some(object) = self.storage.get(key).await? else {
            tracing::info!(key = %key, user_id = %user_id, "Avatar object no longer exists; skipping");
            return Ok(ProcessOutcome::Skipped(SkipReason::ObjectNotFound));
        };

        let content_type = object.content_type.unwrap_or_default();
        let mut thumbnails = self
            .generator
            .generate_avatar(object.body, &content_type, user_id)
            .await?;

        let avatar_url = thumbnails
            .remove(AVATAR_FULL_SIZE_NAME)
            .unwrap_or_else(|| self.storage.public_url_for(key));
        let produced = thumbnails.len();

        if let Err(e) = self
            .store
            .update_user(user_id, &AvatarUpdate::new(avatar_url, thumbnails))
            .await
        {
            tracing::error!(
                error = %e,
                user_id = %user_id,
                key = %key,
                "Failed to store avatar thumbnails"
            );
            return Err(e);
        }

        tracing::info!(
            user_id = %user_id,
            key = %key,
            thumbnails = produced,
            "Avatar processed"
        );

        Ok(ProcessOutcome::Processed)
    }
}
