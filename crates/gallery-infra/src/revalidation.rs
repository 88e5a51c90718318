//! Frontend cache revalidation
//!
//! After the pipeline changes what a page would show, it asks the frontend to drop
//! its cached render for the affected tags. Delivery is best-effort: every failure
//! is logged and swallowed, and callers never see an error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::params::{CachedParameters, RevalidationParams};

const REVALIDATE_PATH: &str = "/api/revalidate";

/// Cache invalidation hook the processors call after a metadata write.
#[async_trait]
pub trait CacheRevalidator: Send + Sync {
    /// Invalidate every tag. Never fails; an empty slice does nothing.
    async fn revalidate(&self, tags: &[String]);
}

#[derive(Debug, Clone)]
pub struct RevalidationNotifierConfig {
    pub timeout_seconds: u64,
}

impl Default for RevalidationNotifierConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
        }
    }
}

/// Posts `POST {frontend}/api/revalidate?secret=...&tag=...` once per tag, concurrently.
pub struct RevalidationNotifier {
    http_client: Client,
    params: Arc<CachedParameters>,
}

impl RevalidationNotifier {
    pub fn new(params: Arc<CachedParameters>, config: RevalidationNotifierConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client for cache revalidation")?;

        Ok(Self {
            http_client,
            params,
        })
    }

    #[tracing::instrument(skip(self, params))]
    async fn revalidate_tag(&self, params: &RevalidationParams, tag: &str) -> Result<()> {
        let url = format!("{}{}", params.frontend_url, REVALIDATE_PATH);
        let response = self
            .http_client
            .post(&url)
            .query(&[("secret", params.secret.as_str()), ("tag", tag)])
            .send()
            .await
            .context("Revalidation request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Revalidation endpoint returned {}: {}", status, body);
        }

        Ok(())
    }
}

#[async_trait]
impl CacheRevalidator for RevalidationNotifier {
    async fn revalidate(&self, tags: &[String]) {
        if tags.is_empty() {
            return;
        }

        let params = match self.params.revalidation_params().await {
            Ok(params) => params,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    tags = ?tags,
                    "Skipping cache revalidation: parameters unavailable"
                );
                return;
            }
        };

        let outcomes = join_all(tags.iter().map(|tag| async move {
            (tag, self.revalidate_tag(params, tag).await)
        }))
        .await;

        for (tag, outcome) in outcomes {
            match outcome {
                Ok(()) => tracing::info!(tag = %tag, "Cache revalidated"),
                Err(e) => tracing::warn!(tag = %tag, error = %e, "Cache revalidation failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::StaticParameterResolver;
    use mockito::Matcher;

    fn notifier(frontend_url: &str) -> (RevalidationNotifier, Arc<StaticParameterResolver>) {
        let resolver = Arc::new(StaticParameterResolver::new([
            ("FRONTEND_URL", frontend_url),
            ("REVALIDATION_SECRET", "s3cr3t"),
        ]));
        let params = Arc::new(CachedParameters::new(
            resolver.clone(),
            "FRONTEND_URL",
            "REVALIDATION_SECRET",
        ));
        let notifier =
            RevalidationNotifier::new(params, RevalidationNotifierConfig { timeout_seconds: 2 })
                .unwrap();
        (notifier, resolver)
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn posts_once_per_tag() {
        let mut server = mockito::Server::new_async().await;
        let albums = server
            .mock("POST", "/api/revalidate")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("secret".into(), "s3cr3t".into()),
                Matcher::UrlEncoded("tag".into(), "albums".into()),
            ]))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let album = server
            .mock("POST", "/api/revalidate")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("secret".into(), "s3cr3t".into()),
                Matcher::UrlEncoded("tag".into(), "album-abc123".into()),
            ]))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let (notifier, _) = notifier(&server.url());
        notifier.revalidate(&tags(&["albums", "album-abc123"])).await;

        albums.assert_async().await;
        album.assert_async().await;
    }

    #[tokio::test]
    async fn empty_tags_make_no_calls() {
        let mut server = mockito::Server::new_async().await;
        let any = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (notifier, resolver) = notifier(&server.url());
        notifier.revalidate(&[]).await;

        any.assert_async().await;
        assert_eq!(resolver.lookups(), 0);
    }

    #[tokio::test]
    async fn endpoint_failures_are_swallowed() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("POST", "/api/revalidate")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .expect(2)
            .create_async()
            .await;

        let (notifier, _) = notifier(&server.url());
        notifier.revalidate(&tags(&["albums", "album-xyz"])).await;

        failing.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_frontend_is_swallowed() {
        let (notifier, _) = notifier("http://127.0.0.1:9");
        notifier.revalidate(&tags(&["albums"])).await;
    }

    #[tokio::test]
    async fn missing_parameters_are_swallowed() {
        let resolver = Arc::new(StaticParameterResolver::new(Vec::<(String, String)>::new()));
        let params = Arc::new(CachedParameters::new(resolver, "FRONTEND_URL", "SECRET"));
        let notifier = RevalidationNotifier::new(params, RevalidationNotifierConfig::default()).unwrap();

        notifier.revalidate(&tags(&["albums"])).await;
    }
}
