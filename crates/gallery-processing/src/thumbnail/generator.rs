use bytes::Bytes;
use futures::stream::{self, StreamExt};
use gallery_core::media_types::{is_one_of, normalize_content_type};
use gallery_core::thumbnails::{AVATAR_FULL_SIZE_NAME, AVATAR_FULL_SIZE_QUALITY, AVATAR_THUMBNAILS};
use gallery_core::{AppError, AppResult, ThumbnailConfig, ThumbnailMap};
use gallery_storage::{ObjectMetadata, Storage};
use std::sync::Arc;
use std::time::Instant;

use super::target::ThumbnailTarget;
use crate::compression::OutputFormat;
use crate::image::ImageTranscoder;

#[derive(Debug, Clone, Copy)]
enum Rendition {
    Resize(ThumbnailConfig),
    FullSize { name: &'static str, quality: u8 },
}

impl Rendition {
    fn name(&self) -> &'static str {
        match self {
            Rendition::Resize(config) => config.name,
            Rendition::FullSize { name, .. } => name,
        }
    }
}

/// Renders a thumbnail matrix and uploads every output.
///
/// Each size is independent: a failed decode, encode or upload for one size is
/// logged and that size is left out of the returned map. An empty map means no
/// thumbnails were produced. Only an unsupported source content type is an error.
pub struct ThumbnailGenerator {
    storage: Arc<dyn Storage>,
    transcoder: Arc<dyn ImageTranscoder>,
    concurrency: usize,
    format: OutputFormat,
}

impl ThumbnailGenerator {
    pub fn new(
        storage: Arc<dyn Storage>,
        transcoder: Arc<dyn ImageTranscoder>,
        concurrency: usize,
    ) -> Self {
        Self {
            storage,
            transcoder,
            concurrency: concurrency.max(1),
            format: OutputFormat::WebP,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// Whether `content_type` is an input this target's generator accepts.
    pub fn supports(content_type: &str, target: &ThumbnailTarget) -> bool {
        is_one_of(content_type, target.accepted_types())
    }

    /// Render `configs` for `target` and return the sizes that made it to storage.
    #[tracing::instrument(skip(self, source, configs), fields(owner = target.label()))]
    pub async fn generate(
        &self,
        source: Bytes,
        content_type: &str,
        target: &ThumbnailTarget,
        configs: &[ThumbnailConfig],
    ) -> AppResult<ThumbnailMap> {
        Self::ensure_supported(content_type, target)?;
        let renditions = configs.iter().copied().map(Rendition::Resize).collect();
        Ok(self.render_all(source, target, renditions).await)
    }

    /// Full-size re-encode plus the avatar matrix, under the user's avatar prefix.
    #[tracing::instrument(skip(self, source))]
    pub async fn generate_avatar(
        &self,
        source: Bytes,
        content_type: &str,
        user_id: &str,
    ) -> AppResult<ThumbnailMap> {
        let target = ThumbnailTarget::Avatar {
            user_id: user_id.to_string(),
        };
        Self::ensure_supported(content_type, &target)?;

        let mut renditions = vec![Rendition::FullSize {
            name: AVATAR_FULL_SIZE_NAME,
            quality: AVATAR_FULL_SIZE_QUALITY,
        }];
        renditions.extend(AVATAR_THUMBNAILS.iter().copied().map(Rendition::Resize));

        Ok(self.render_all(source, &target, renditions).await)
    }

    fn ensure_supported(content_type: &str, target: &ThumbnailTarget) -> AppResult<()> {
        if Self::supports(content_type, target) {
            Ok(())
        } else {
            Err(AppError::UnsupportedMediaType(format!(
                "{} cannot be used for {} thumbnails",
                normalize_content_type(content_type),
                target.label()
            )))
        }
    }

    async fn render_all(
        &self,
        source: Bytes,
        target: &ThumbnailTarget,
        renditions: Vec<Rendition>,
    ) -> ThumbnailMap {
        let start = Instant::now();
        let requested = renditions.len();

        let results: Vec<(Rendition, AppResult<String>)> = stream::iter(renditions)
            .map(|rendition| {
                let source = source.clone();
                async move { (rendition, self.render_one(source, target, rendition).await) }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut thumbnails = ThumbnailMap::new();
        for (rendition, result) in results {
            match result {
                Ok(url) => {
                    thumbnails.insert(rendition.name().to_string(), url);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        size = rendition.name(),
                        owner = target.label(),
                        "Thumbnail size failed; omitting it"
                    );
                }
            }
        }

        tracing::info!(
            owner = target.label(),
            requested,
            produced = thumbnails.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail generation finished"
        );

        thumbnails
    }

    async fn render_one(
        &self,
        source: Bytes,
        target: &ThumbnailTarget,
        rendition: Rendition,
    ) -> AppResult<String> {
        let transcoder = Arc::clone(&self.transcoder);
        let format = self.format;

        // Decode and encode are CPU-bound; keep them off the async workers.
        let encoded = tokio::task::spawn_blocking(move || match rendition {
            Rendition::Resize(config) => {
                transcoder.thumbnail(&source, config.width, config.height, config.quality, format)
            }
            Rendition::FullSize { quality, .. } => transcoder.reencode(&source, quality, format),
        })
        .await
        .map_err(|e| AppError::Internal(format!("Thumbnail task failed: {}", e)))??;

        let extension = format.extension();
        let key = match rendition {
            Rendition::Resize(config) => target.key_for(&config, extension),
            Rendition::FullSize { name, .. } => target.key_for_name(name, "", extension),
        };

        let mut metadata = ObjectMetadata::new();
        metadata.insert("size".to_string(), rendition.name().to_string());
        if let ThumbnailTarget::AlbumMedia { source_key } = target {
            metadata.insert("source-key".to_string(), source_key.clone());
        }

        let size_bytes = encoded.len();
        let url = self
            .storage
            .put(&key, encoded, format.to_mime_type(), &metadata)
            .await?;

        tracing::debug!(
            key = %key,
            size = rendition.name(),
            size_bytes,
            "Thumbnail uploaded"
        );

        Ok(url)
    }
}
