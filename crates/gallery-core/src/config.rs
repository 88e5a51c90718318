//! Configuration module
//!
//! Pipeline configuration is read once per process from the environment (with
//! `.env` support via dotenvy). Missing or unparsable numeric values fall back to
//! their defaults; structural problems are reported by [`Config::validate`].

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4100;
const DB_MAX_CONNECTIONS: u32 = 10;
const DB_TIMEOUT_SECS: u64 = 30;
const MEDIA_LOOKUP_PAGE_SIZE: usize = 100;
const THUMBNAIL_CONCURRENCY: usize = 3;
const REVALIDATION_TIMEOUT_SECS: u64 = 10;
const FRONTEND_URL_PARAM: &str = "FRONTEND_URL";
const REVALIDATION_SECRET_PARAM: &str = "REVALIDATION_SECRET";

/// Where media, user and album records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBackend {
    Postgres,
    /// Process-local store, for development without a database
    Memory,
}

impl FromStr for MetadataBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(MetadataBackend::Postgres),
            "memory" => Ok(MetadataBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid metadata backend: {}", s)),
        }
    }
}

impl Display for MetadataBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MetadataBackend::Postgres => write!(f, "postgres"),
            MetadataBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Upload pipeline configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub server_port: u16,
    pub log_format: LogFormat,
    // Object store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, etc.)
    pub storage_public_base_url: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Metadata store
    pub metadata_backend: MetadataBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub media_lookup_page_size: usize,
    // Processing
    pub thumbnail_concurrency: usize,
    // Cache revalidation
    pub revalidation_timeout_seconds: u64,
    pub frontend_url_param: String,
    pub revalidation_secret_param: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = var("STORAGE_BACKEND")
            .unwrap_or_else(|| "s3".to_string())
            .parse::<StorageBackend>()?;

        let metadata_backend = var("METADATA_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .parse::<MetadataBackend>()?;

        let log_format = var("LOG_FORMAT")
            .unwrap_or_else(|| "pretty".to_string())
            .parse::<LogFormat>()?;

        let server_port = var("PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(SERVER_PORT);

        let db_max_connections = var("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DB_MAX_CONNECTIONS);

        let db_timeout_seconds = var("DB_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DB_TIMEOUT_SECS);

        let media_lookup_page_size = var("MEDIA_LOOKUP_PAGE_SIZE")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MEDIA_LOOKUP_PAGE_SIZE);

        let thumbnail_concurrency = var("THUMBNAIL_CONCURRENCY")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(THUMBNAIL_CONCURRENCY);

        let revalidation_timeout_seconds = var("REVALIDATION_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(REVALIDATION_TIMEOUT_SECS);

        Ok(Config {
            environment,
            server_port,
            log_format,
            storage_backend,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            s3_endpoint: var("S3_ENDPOINT"),
            storage_public_base_url: var("STORAGE_PUBLIC_BASE_URL"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            metadata_backend,
            database_url: var("DATABASE_URL"),
            db_max_connections,
            db_timeout_seconds,
            media_lookup_page_size,
            thumbnail_concurrency,
            revalidation_timeout_seconds,
            frontend_url_param: var("FRONTEND_URL_PARAM")
                .unwrap_or_else(|| FRONTEND_URL_PARAM.to_string()),
            revalidation_secret_param: var("REVALIDATION_SECRET_PARAM")
                .unwrap_or_else(|| REVALIDATION_SECRET_PARAM.to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!("S3_BUCKET is required when STORAGE_BACKEND=s3"));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION is required when STORAGE_BACKEND=s3"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL are required when STORAGE_BACKEND=local"
                    ));
                }
            }
        }

        if self.metadata_backend == MetadataBackend::Postgres {
            match &self.database_url {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL is required when METADATA_BACKEND=postgres"
                    ))
                }
            }
        }

        if self.media_lookup_page_size == 0 {
            return Err(anyhow::anyhow!("MEDIA_LOOKUP_PAGE_SIZE must be at least 1"));
        }

        if self.thumbnail_concurrency == 0 {
            return Err(anyhow::anyhow!("THUMBNAIL_CONCURRENCY must be at least 1"));
        }

        if self.is_production() && self.metadata_backend == MetadataBackend::Memory {
            return Err(anyhow::anyhow!(
                "METADATA_BACKEND=memory is not allowed in production"
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }
}
