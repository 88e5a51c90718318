//! Pipeline service wiring

use anyhow::{Context, Result};
use gallery_core::{Config, MetadataBackend};
use gallery_db::{InMemoryMetadataStore, MediaMetadataStore, PgMetadataStore};
use gallery_infra::{
    CachedParameters, EnvParameterResolver, RevalidationNotifier, RevalidationNotifierConfig,
};
use gallery_processing::{NativeImageTranscoder, PipelineServices, PipelineSettings};
use std::sync::Arc;

/// Build every collaborator the pipeline needs, once per process.
pub async fn build_pipeline_services(config: &Config) -> Result<PipelineServices> {
    let storage = gallery_storage::create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = storage.bucket().unwrap_or("-"),
        "Storage initialized"
    );

    let store = setup_metadata_store(config).await?;

    let params = Arc::new(CachedParameters::new(
        Arc::new(EnvParameterResolver),
        config.frontend_url_param.clone(),
        config.revalidation_secret_param.clone(),
    ));
    let revalidator = RevalidationNotifier::new(
        params,
        RevalidationNotifierConfig {
            timeout_seconds: config.revalidation_timeout_seconds,
        },
    )?;

    let settings = PipelineSettings::from_config(config);
    tracing::info!(
        media_lookup_page_size = settings.media_lookup_page_size,
        thumbnail_concurrency = settings.thumbnail_concurrency,
        "Pipeline services initialized"
    );

    Ok(PipelineServices {
        storage,
        store,
        transcoder: Arc::new(NativeImageTranscoder),
        revalidator: Arc::new(revalidator),
        settings,
    })
}

async fn setup_metadata_store(config: &Config) -> Result<Arc<dyn MediaMetadataStore>> {
    match config.metadata_backend {
        MetadataBackend::Postgres => {
            let pool = gallery_db::connect(config)
                .await
                .context("Failed to connect to database")?;
            gallery_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
            Ok(Arc::new(PgMetadataStore::new(pool)))
        }
        MetadataBackend::Memory => {
            tracing::warn!("Using in-memory metadata store; records are lost on restart");
            Ok(Arc::new(InMemoryMetadataStore::new()))
        }
    }
}
