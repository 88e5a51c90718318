mod generator;
mod target;

pub use generator::ThumbnailGenerator;
pub use target::ThumbnailTarget;

/// The primary thumbnail of a map: the preferred size if present, else the first
/// entry produced in matrix order.
pub fn primary_thumbnail(
    thumbnails: &gallery_core::ThumbnailMap,
    matrix: &[gallery_core::ThumbnailConfig],
) -> Option<String> {
    thumbnails
        .get(gallery_core::thumbnails::PRIMARY_THUMBNAIL)
        .or_else(|| matrix.iter().find_map(|config| thumbnails.get(config.name)))
        .cloned()
}
