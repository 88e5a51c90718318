use async_trait::async_trait;
use gallery_core::{
    AlbumCoverUpdate, AlbumRecord, AppError, AppResult, AvatarUpdate, MediaPage, MediaRecord,
    MediaUpdate, UserRecord,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::traits::MediaMetadataStore;

#[derive(Default)]
struct Tables {
    media: BTreeMap<String, MediaRecord>,
    users: BTreeMap<String, UserRecord>,
    albums: BTreeMap<String, AlbumRecord>,
}

/// Process-local metadata store.
///
/// Uses the trait's paginated key lookup, so it also exercises the scan path the
/// Postgres store replaces with an indexed query.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    tables: Mutex<Tables>,
    writes: AtomicUsize,
    pages_listed: AtomicUsize,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("metadata store lock poisoned".to_string()))
    }

    pub fn insert_media(&self, record: MediaRecord) -> AppResult<()> {
        self.tables()?.media.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn insert_user(&self, record: UserRecord) -> AppResult<()> {
        self.tables()?.users.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn insert_album(&self, record: AlbumRecord) -> AppResult<()> {
        self.tables()?.albums.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn media(&self, media_id: &str) -> Option<MediaRecord> {
        self.tables().ok()?.media.get(media_id).cloned()
    }

    pub fn user(&self, user_id: &str) -> Option<UserRecord> {
        self.tables().ok()?.users.get(user_id).cloned()
    }

    pub fn album(&self, album_id: &str) -> Option<AlbumRecord> {
        self.tables().ok()?.albums.get(album_id).cloned()
    }

    /// Number of successful update calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of listing pages served.
    pub fn pages_listed(&self) -> usize {
        self.pages_listed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaMetadataStore for InMemoryMetadataStore {
    async fn list_album_media(
        &self,
        album_id: &str,
        page_size: usize,
        cursor: Option<&str>,
    ) -> AppResult<MediaPage> {
        let limit = page_size.max(1);
        let tables = self.tables()?;
        let mut matching = tables
            .media
            .values()
            .filter(|m| m.album_id == album_id)
            .filter(|m| cursor.map_or(true, |c| m.id.as_str() > c));

        let items: Vec<MediaRecord> = matching.by_ref().take(limit).cloned().collect();
        let next_cursor = if matching.next().is_some() {
            items.last().map(|m| m.id.clone())
        } else {
            None
        };

        self.pages_listed.fetch_add(1, Ordering::SeqCst);
        Ok(MediaPage { items, next_cursor })
    }

    async fn update_media(&self, media_id: &str, update: &MediaUpdate) -> AppResult<()> {
        let mut tables = self.tables()?;
        let record = tables
            .media
            .get_mut(media_id)
            .ok_or_else(|| AppError::NotFound(format!("media {}", media_id)))?;
        record.apply(update);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_user(&self, user_id: &str, update: &AvatarUpdate) -> AppResult<()> {
        let mut tables = self.tables()?;
        let record = tables
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;
        record.apply(update);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_album(&self, album_id: &str, update: &AlbumCoverUpdate) -> AppResult<()> {
        let mut tables = self.tables()?;
        let record = tables
            .albums
            .get_mut(album_id)
            .ok_or_else(|| AppError::NotFound(format!("album {}", album_id)))?;
        record.apply(update);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::{MediaStatus, ThumbnailMap};

    fn seed(store: &InMemoryMetadataStore, count: usize) {
        for i in 0..count {
            store
                .insert_media(MediaRecord::pending(
                    format!("m{:03}", i),
                    "abc123",
                    format!("albums/abc123/media/photo{}.jpg", i),
                    "image/jpeg",
                ))
                .unwrap();
        }
        store
            .insert_media(MediaRecord::pending(
                "other",
                "xyz",
                "albums/xyz/media/photo0.jpg",
                "image/jpeg",
            ))
            .unwrap();
    }

    #[tokio::test]
    async fn lookup_pages_past_the_first_page() {
        let store = InMemoryMetadataStore::new();
        seed(&store, 25);

        let found = store
            .find_media_by_storage_key("abc123", "albums/abc123/media/photo23.jpg", 10)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "m023");
        assert_eq!(store.pages_listed(), 3);
    }

    #[tokio::test]
    async fn lookup_is_scoped_to_the_album() {
        let store = InMemoryMetadataStore::new();
        seed(&store, 3);

        let found = store
            .find_media_by_storage_key("abc123", "albums/xyz/media/photo0.jpg", 10)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn lookup_miss_scans_every_page_once() {
        let store = InMemoryMetadataStore::new();
        seed(&store, 20);

        let found = store
            .find_media_by_storage_key("abc123", "albums/abc123/media/missing.png", 10)
            .await
            .unwrap();
        assert!(found.is_none());
        assert_eq!(store.pages_listed(), 2);
    }

    #[tokio::test]
    async fn update_media_merges_and_counts_writes() {
        let store = InMemoryMetadataStore::new();
        seed(&store, 1);

        let mut map = ThumbnailMap::new();
        map.insert("small".to_string(), "https://cdn/s.webp".to_string());
        store
            .update_media(
                "m000",
                &MediaUpdate::uploaded().with_thumbnails("https://cdn/s.webp".to_string(), map),
            )
            .await
            .unwrap();
        store
            .update_media("m000", &MediaUpdate::uploaded())
            .await
            .unwrap();

        let record = store.media("m000").unwrap();
        assert_eq!(record.status, MediaStatus::Uploaded);
        assert_eq!(record.thumbnail_url.as_deref(), Some("https://cdn/s.webp"));
        assert_eq!(record.thumbnails.len(), 1);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn updating_unknown_records_is_not_found() {
        let store = InMemoryMetadataStore::new();
        let err = store
            .update_user(
                "ghost",
                &AvatarUpdate::new("https://cdn/a.webp".to_string(), ThumbnailMap::new()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.write_count(), 0);
    }
}
