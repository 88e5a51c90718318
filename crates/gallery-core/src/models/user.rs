use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ThumbnailMap;

/// Avatar fields embedded in a user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub avatar_thumbnails: ThumbnailMap,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn apply(&mut self, update: &AvatarUpdate) {
        self.avatar_url = Some(update.avatar_url.clone());
        self.avatar_thumbnails = update.thumbnails.clone();
        self.updated_at = Some(update.updated_at);
    }
}

/// Sole write the avatar processor performs.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarUpdate {
    pub avatar_url: String,
    pub thumbnails: ThumbnailMap,
    pub updated_at: DateTime<Utc>,
}

impl AvatarUpdate {
    pub fn new(avatar_url: String, thumbnails: ThumbnailMap) -> Self {
        Self {
            avatar_url,
            thumbnails,
            updated_at: Utc::now(),
        }
    }
}
