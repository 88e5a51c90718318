use async_trait::async_trait;
use gallery_core::{AlbumCoverUpdate, AppResult, AvatarUpdate, MediaPage, MediaRecord, MediaUpdate};

/// Record store the upload pipeline reads from and writes to.
///
/// Records are created elsewhere (the upload-URL request handler, user signup,
/// album creation). The pipeline only looks media up and applies partial updates.
#[async_trait]
pub trait MediaMetadataStore: Send + Sync {
    /// One page of an album's media, ordered by id.
    async fn list_album_media(
        &self,
        album_id: &str,
        page_size: usize,
        cursor: Option<&str>,
    ) -> AppResult<MediaPage>;

    /// Find the media record whose storage key equals `storage_key`.
    ///
    /// Pages through the album until a match is found or the listing is exhausted.
    /// Backends with an index on `(album_id, storage_key)` should override this.
    async fn find_media_by_storage_key(
        &self,
        album_id: &str,
        storage_key: &str,
        page_size: usize,
    ) -> AppResult<Option<MediaRecord>> {
        let page_size = page_size.max(1);
        let mut cursor: Option<String> = None;
        let mut scanned = 0usize;

        loop {
            let page = self
                .list_album_media(album_id, page_size, cursor.as_deref())
                .await?;
            scanned += page.items.len();

            if let Some(record) = page
                .items
                .into_iter()
                .find(|media| media.storage_key == storage_key)
            {
                return Ok(Some(record));
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    tracing::debug!(
                        album_id = %album_id,
                        key = %storage_key,
                        scanned,
                        "No media record matches storage key"
                    );
                    return Ok(None);
                }
            }
        }
    }

    /// Apply a partial update. Status never reverts and thumbnail entries are merged.
    async fn update_media(&self, media_id: &str, update: &MediaUpdate) -> AppResult<()>;

    /// Write a user's avatar fields.
    async fn update_user(&self, user_id: &str, update: &AvatarUpdate) -> AppResult<()>;

    /// Write an album's cover thumbnails.
    async fn update_album(&self, album_id: &str, update: &AlbumCoverUpdate) -> AppResult<()>;
}
