use gallery_core::media_types::{ALBUM_IMAGE_TYPES, AVATAR_IMAGE_TYPES};
use gallery_core::ThumbnailConfig;
use gallery_storage::keys;

/// Owner of a thumbnail set; decides key layout and accepted inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailTarget {
    /// Renditions beside an album upload: `{dir}/thumbnails/{stem}{suffix}.{ext}`
    AlbumMedia { source_key: String },
    /// `albums/{albumId}/cover/thumbnails/{size}.{ext}`
    AlbumCover { album_id: String },
    /// `users/{userId}/avatar/thumbnails/{size}.{ext}`
    Avatar { user_id: String },
}

impl ThumbnailTarget {
    pub fn key_for(&self, config: &ThumbnailConfig, extension: &str) -> String {
        self.key_for_name(config.name, config.suffix, extension)
    }

    /// Key for a rendition that is not part of a size matrix.
    pub fn key_for_name(&self, name: &str, suffix: &str, extension: &str) -> String {
        match self {
            ThumbnailTarget::AlbumMedia { source_key } => {
                keys::media_thumbnail_key(source_key, suffix, extension)
            }
            ThumbnailTarget::AlbumCover { album_id } => {
                keys::album_cover_thumbnail_key(album_id, name, extension)
            }
            ThumbnailTarget::Avatar { user_id } => {
                keys::avatar_thumbnail_key(user_id, name, extension)
            }
        }
    }

    pub fn accepted_types(&self) -> &'static [&'static str] {
        match self {
            ThumbnailTarget::Avatar { .. } => AVATAR_IMAGE_TYPES,
            ThumbnailTarget::AlbumMedia { .. } | ThumbnailTarget::AlbumCover { .. } => {
                ALBUM_IMAGE_TYPES
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThumbnailTarget::AlbumMedia { .. } => "album_media",
            ThumbnailTarget::AlbumCover { .. } => "album_cover",
            ThumbnailTarget::Avatar { .. } => "avatar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::thumbnails::{ALBUM_THUMBNAILS, AVATAR_THUMBNAILS};

    #[test]
    fn album_media_keys_use_the_source_stem() {
        let target = ThumbnailTarget::AlbumMedia {
            source_key: "albums/abc123/media/photo.jpg".to_string(),
        };
        assert_eq!(
            target.key_for(&ALBUM_THUMBNAILS[0], "webp"),
            "albums/abc123/media/thumbnails/photo_small.webp"
        );
    }

    #[test]
    fn avatar_and_cover_keys_use_the_size_name() {
        let avatar = ThumbnailTarget::Avatar {
            user_id: "u1".to_string(),
        };
        assert_eq!(
            avatar.key_for(&AVATAR_THUMBNAILS[2], "webp"),
            "users/u1/avatar/thumbnails/large.webp"
        );

        let cover = ThumbnailTarget::AlbumCover {
            album_id: "abc123".to_string(),
        };
        assert_eq!(
            cover.key_for(&ALBUM_THUMBNAILS[1], "webp"),
            "albums/abc123/cover/thumbnails/cover.webp"
        );
    }

    #[test]
    fn avatars_reject_gif() {
        let avatar = ThumbnailTarget::Avatar {
            user_id: "u1".to_string(),
        };
        assert!(!avatar.accepted_types().contains(&"image/gif"));
    }
}
