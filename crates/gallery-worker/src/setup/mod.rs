//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use gallery_core::Config;
use gallery_processing::UploadEventRouter;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    gallery_infra::init_telemetry(config.log_format, &config.environment)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        storage_backend = %config.storage_backend,
        metadata_backend = %config.metadata_backend,
        "Configuration loaded and validated successfully"
    );

    let services = services::build_pipeline_services(&config).await?;

    let state = Arc::new(AppState {
        router: Arc::new(UploadEventRouter::new(&services)),
        storage_backend: config.storage_backend,
    });

    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
