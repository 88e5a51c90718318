use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ThumbnailMap;

/// Upload lifecycle of a media item. Only ever moves `Pending -> Uploaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    Pending,
    Uploaded,
}

impl MediaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStatus::Pending => "pending",
            MediaStatus::Uploaded => "uploaded",
        }
    }

    /// Status after applying `next`; an uploaded item never reverts.
    pub fn advance(self, next: MediaStatus) -> MediaStatus {
        match (self, next) {
            (MediaStatus::Uploaded, _) => MediaStatus::Uploaded,
            (_, next) => next,
        }
    }
}

impl FromStr for MediaStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MediaStatus::Pending),
            "uploaded" => Ok(MediaStatus::Uploaded),
            other => Err(anyhow::anyhow!("Invalid media status: {}", other)),
        }
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    pub album_id: String,
    pub storage_key: String,
    pub mime_type: String,
    pub status: MediaStatus,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub thumbnails: ThumbnailMap,
    pub display_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    /// A freshly registered upload, as written by the upload-URL request handler.
    pub fn pending(
        id: impl Into<String>,
        album_id: impl Into<String>,
        storage_key: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            album_id: album_id.into(),
            storage_key: storage_key.into(),
            mime_type: mime_type.into(),
            status: MediaStatus::Pending,
            thumbnail_url: None,
            thumbnails: ThumbnailMap::new(),
            display_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update: thumbnail entries are added, never removed.
    pub fn apply(&mut self, update: &MediaUpdate) {
        self.status = self.status.advance(update.status);
        if let Some(url) = &update.thumbnail_url {
            self.thumbnail_url = Some(url.clone());
        }
        if let Some(url) = &update.display_url {
            self.display_url = Some(url.clone());
        }
        self.thumbnails.extend(
            update
                .thumbnails
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.updated_at = update.updated_at;
    }
}

/// Partial update written by the album-media processor.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpdate {
    pub status: MediaStatus,
    pub thumbnail_url: Option<String>,
    pub thumbnails: ThumbnailMap,
    pub display_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MediaUpdate {
    /// Status-only update. Every update the pipeline writes starts here.
    pub fn uploaded() -> Self {
        Self {
            status: MediaStatus::Uploaded,
            thumbnail_url: None,
            thumbnails: ThumbnailMap::new(),
            display_url: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_thumbnails(mut self, primary: String, thumbnails: ThumbnailMap) -> Self {
        self.thumbnail_url = Some(primary);
        self.thumbnails = thumbnails;
        self
    }

    pub fn with_display_url(mut self, url: Option<String>) -> Self {
        self.display_url = url;
        self
    }

    pub fn has_thumbnail_data(&self) -> bool {
        self.thumbnail_url.is_some() || !self.thumbnails.is_empty() || self.display_url.is_some()
    }
}

/// One page of an album's media listing.
#[derive(Debug, Clone, Default)]
pub struct MediaPage {
    pub items: Vec<MediaRecord>,
    /// Opaque cursor for the next page; `None` when the listing is exhausted.
    pub next_cursor: Option<String>,
}
