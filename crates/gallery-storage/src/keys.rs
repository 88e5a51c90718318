//! Storage key derivation.
//!
//! Every key the pipeline writes is derived from either the uploaded object's key or
//! an owning entity id, so redelivered events overwrite the same objects.

/// Directory holding derived renditions, relative to the upload's directory.
pub const THUMBNAILS_DIR: &str = "thumbnails";

/// Parts of an object key: directory (no trailing slash), file stem and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParts<'a> {
    pub dir: &'a str,
    pub stem: &'a str,
    pub extension: Option<&'a str>,
}

pub fn split_key(storage_key: &str) -> KeyParts<'_> {
    let (dir, file) = match storage_key.rfind('/') {
        Some(idx) => (&storage_key[..idx], &storage_key[idx + 1..]),
        None => ("", storage_key),
    };
    let (stem, extension) = match file.rfind('.') {
        Some(idx) if idx > 0 => (&file[..idx], Some(&file[idx + 1..])),
        _ => (file, None),
    };
    KeyParts {
        dir,
        stem,
        extension,
    }
}

fn join(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", dir, rest)
    }
}

/// `{dir}/thumbnails/{stem}{suffix}.{ext}` for an album media upload.
pub fn media_thumbnail_key(source_key: &str, suffix: &str, extension: &str) -> String {
    let parts = split_key(source_key);
    join(
        parts.dir,
        &format!("{}/{}{}.{}", THUMBNAILS_DIR, parts.stem, suffix, extension),
    )
}

/// `{dir}/{stem}{suffix}.{ext}`, a sibling of the uploaded object.
pub fn sibling_key(source_key: &str, suffix: &str, extension: &str) -> String {
    let parts = split_key(source_key);
    join(parts.dir, &format!("{}{}.{}", parts.stem, suffix, extension))
}

pub fn avatar_thumbnail_key(user_id: &str, size: &str, extension: &str) -> String {
    format!(
        "users/{}/avatar/{}/{}.{}",
        user_id, THUMBNAILS_DIR, size, extension
    )
}

pub fn album_cover_thumbnail_key(album_id: &str, size: &str, extension: &str) -> String {
    format!(
        "albums/{}/cover/{}/{}.{}",
        album_id, THUMBNAILS_DIR, size, extension
    )
}

/// Whether any path segment of the key is the thumbnails directory.
pub fn is_thumbnail_key(storage_key: &str) -> bool {
    storage_key.split('/').any(|segment| segment == THUMBNAILS_DIR)
}
