use gallery_core::LogFormat;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "gallery=debug,tower_http=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Fails if a subscriber is already set.
pub fn init_telemetry(
    log_format: LogFormat,
    environment: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()));

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?,
        LogFormat::Pretty => registry.with(fmt::layer()).try_init()?,
    }

    tracing::info!(environment = %environment, ?log_format, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        let _ = init_telemetry(LogFormat::Pretty, "test");
        assert!(init_telemetry(LogFormat::Json, "test").is_err());
    }
}
