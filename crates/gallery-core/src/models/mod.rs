mod album;
mod media;
mod user;

pub use album::{AlbumCoverUpdate, AlbumRecord};
pub use media::{MediaPage, MediaRecord, MediaStatus, MediaUpdate};
pub use user::{AvatarUpdate, UserRecord};

use std::collections::BTreeMap;

/// Size name to public URL. A missing entry means that size was not produced.
pub type ThumbnailMap = BTreeMap<String, String>;
