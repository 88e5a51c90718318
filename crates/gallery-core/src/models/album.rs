use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ThumbnailMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub id: String,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub cover_thumbnails: ThumbnailMap,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AlbumRecord {
    pub fn apply(&mut self, update: &AlbumCoverUpdate) {
        if let Some(url) = &update.cover_url {
            self.cover_url = Some(url.clone());
        }
        self.cover_thumbnails = update.thumbnails.clone();
        self.updated_at = Some(update.updated_at);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlbumCoverUpdate {
    pub cover_url: Option<String>,
    pub thumbnails: ThumbnailMap,
    pub updated_at: DateTime<Utc>,
}

impl AlbumCoverUpdate {
    pub fn new(cover_url: Option<String>, thumbnails: ThumbnailMap) -> Self {
        Self {
            cover_url,
            thumbnails,
            updated_at: Utc::now(),
        }
    }
}
