//! Parameter resolution
//!
//! The frontend base URL and the revalidation secret are resolved by name through a
//! [`ParameterResolver`] and cached for the life of the process. A failed resolution
//! is not cached, so the next caller retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[async_trait]
pub trait ParameterResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<String>;
}

/// Reads parameters from process environment variables.
#[derive(Debug, Default, Clone)]
pub struct EnvParameterResolver;

#[async_trait]
impl ParameterResolver for EnvParameterResolver {
    async fn resolve(&self, name: &str) -> Result<String> {
        let value = std::env::var(name)
            .with_context(|| format!("Parameter {} is not set", name))?;
        if value.trim().is_empty() {
            anyhow::bail!("Parameter {} is empty", name);
        }
        Ok(value)
    }
}

/// Fixed parameter values, counting lookups.
#[derive(Debug, Default)]
pub struct StaticParameterResolver {
    values: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl StaticParameterResolver {
    pub fn new<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParameterResolver for StaticParameterResolver {
    async fn resolve(&self, name: &str) -> Result<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.values
            .get(name)
            .cloned()
            .with_context(|| format!("Parameter {} is not set", name))
    }
}

/// Values the revalidation notifier needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevalidationParams {
    pub frontend_url: String,
    pub secret: String,
}

/// Process-wide memo of resolved parameters.
pub struct CachedParameters {
    resolver: Arc<dyn ParameterResolver>,
    frontend_url_param: String,
    secret_param: String,
    revalidation: OnceCell<RevalidationParams>,
}

impl CachedParameters {
    pub fn new(
        resolver: Arc<dyn ParameterResolver>,
        frontend_url_param: impl Into<String>,
        secret_param: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            frontend_url_param: frontend_url_param.into(),
            secret_param: secret_param.into(),
            revalidation: OnceCell::new(),
        }
    }

    pub async fn revalidation_params(&self) -> Result<&RevalidationParams> {
        self.revalidation
            .get_or_try_init(|| async {
                let (frontend_url, secret) = tokio::try_join!(
                    self.resolver.resolve(&self.frontend_url_param),
                    self.resolver.resolve(&self.secret_param),
                )?;
                tracing::debug!(frontend_url = %frontend_url, "Resolved revalidation parameters");
                Ok::<_, anyhow::Error>(RevalidationParams {
                    frontend_url: frontend_url.trim_end_matches('/').to_string(),
                    secret,
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_once_per_process() {
        let resolver = Arc::new(StaticParameterResolver::new([
            ("FRONTEND_URL", "https://gallery.example.com/"),
            ("REVALIDATION_SECRET", "s3cr3t"),
        ]));
        let params = CachedParameters::new(resolver.clone(), "FRONTEND_URL", "REVALIDATION_SECRET");

        let first = params.revalidation_params().await.unwrap().clone();
        let second = params.revalidation_params().await.unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(first.frontend_url, "https://gallery.example.com");
        assert_eq!(resolver.lookups(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let resolver = Arc::new(StaticParameterResolver::new([("FRONTEND_URL", "https://x")]));
        let params = CachedParameters::new(resolver.clone(), "FRONTEND_URL", "REVALIDATION_SECRET");

        assert!(params.revalidation_params().await.is_err());
        assert!(params.revalidation_params().await.is_err());
        assert_eq!(resolver.lookups(), 4);
    }

    #[tokio::test]
    async fn env_resolver_reports_missing_variables() {
        let err = EnvParameterResolver
            .resolve("GALLERY_TEST_PARAM_THAT_IS_NEVER_SET")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("GALLERY_TEST_PARAM_THAT_IS_NEVER_SET"));
    }
}
