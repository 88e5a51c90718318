use gallery_core::Config;
use gallery_db::MediaMetadataStore;
use gallery_infra::CacheRevalidator;
use gallery_storage::Storage;
use std::sync::Arc;

use crate::image::ImageTranscoder;
use crate::normalizer::FormatNormalizer;
use crate::thumbnail::ThumbnailGenerator;

const MEDIA_LOOKUP_PAGE_SIZE: usize = 100;
const THUMBNAIL_CONCURRENCY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Page size for scanning an album when looking media up by storage key
    pub media_lookup_page_size: usize,
    /// Upper bound on sizes rendered at once for one event
    pub thumbnail_concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            media_lookup_page_size: MEDIA_LOOKUP_PAGE_SIZE,
            thumbnail_concurrency: THUMBNAIL_CONCURRENCY,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            media_lookup_page_size: config.media_lookup_page_size,
            thumbnail_concurrency: config.thumbnail_concurrency,
        }
    }
}

/// Collaborators shared by every processor, built once per process.
#[derive(Clone)]
pub struct PipelineServices {
    pub storage: Arc<dyn Storage>,
    pub store: Arc<dyn MediaMetadataStore>,
    pub transcoder: Arc<dyn ImageTranscoder>,
    pub revalidator: Arc<dyn CacheRevalidator>,
    pub settings: PipelineSettings,
}

impl PipelineServices {
    pub fn thumbnail_generator(&self) -> ThumbnailGenerator {
        ThumbnailGenerator::new(
            Arc::clone(&self.storage),
            Arc::clone(&self.transcoder),
            self.settings.thumbnail_concurrency,
        )
    }

    pub fn format_normalizer(&self) -> FormatNormalizer {
        FormatNormalizer::new(Arc::clone(&self.transcoder))
    }
}
