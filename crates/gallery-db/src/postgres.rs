use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gallery_core::{
    AlbumCoverUpdate, AppError, AppResult, AvatarUpdate, Config, MediaPage, MediaRecord,
    MediaStatus, MediaUpdate, ThumbnailMap,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use std::time::Duration;

use crate::traits::MediaMetadataStore;

const MEDIA_COLUMNS: &str = "id, album_id, storage_key, mime_type, status, thumbnail_url, \
     thumbnails, display_url, created_at, updated_at";

/// Open the connection pool described by the configuration.
pub async fn connect(config: &Config) -> AppResult<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Configuration("DATABASE_URL not configured".to_string()))?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Database connected successfully"
    );

    Ok(pool)
}

/// Apply the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(e.into()))?;
    tracing::info!("Database migrations applied");
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct MediaRow {
    id: String,
    album_id: String,
    storage_key: String,
    mime_type: String,
    status: String,
    thumbnail_url: Option<String>,
    thumbnails: Json<ThumbnailMap>,
    display_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MediaRow> for MediaRecord {
    type Error = AppError;

    fn try_from(row: MediaRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<MediaStatus>()
            .map_err(|e| AppError::Internal(format!("media {}: {}", row.id, e)))?;
        Ok(MediaRecord {
            id: row.id,
            album_id: row.album_id,
            storage_key: row.storage_key,
            mime_type: row.mime_type,
            status,
            thumbnail_url: row.thumbnail_url,
            thumbnails: row.thumbnails.0,
            display_url: row.display_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Postgres-backed metadata store
#[derive(Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MediaMetadataStore for PgMetadataStore {
    #[tracing::instrument(skip(self))]
    async fn list_album_media(
        &self,
        album_id: &str,
        page_size: usize,
        cursor: Option<&str>,
    ) -> AppResult<MediaPage> {
        let limit = page_size.max(1);
        let rows: Vec<MediaRow> = sqlx::query_as::<Postgres, MediaRow>(&format!(
            "SELECT {} FROM media WHERE album_id = $1 AND ($2::text IS NULL OR id > $2) \
             ORDER BY id LIMIT $3",
            MEDIA_COLUMNS
        ))
        .bind(album_id)
        .bind(cursor)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let next_cursor = if rows.len() == limit {
            rows.last().map(|row| row.id.clone())
        } else {
            None
        };

        let items = rows
            .into_iter()
            .map(MediaRecord::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(MediaPage { items, next_cursor })
    }

    #[tracing::instrument(skip(self, _page_size))]
    async fn find_media_by_storage_key(
        &self,
        album_id: &str,
        storage_key: &str,
        _page_size: usize,
    ) -> AppResult<Option<MediaRecord>> {
        let row: Option<MediaRow> = sqlx::query_as::<Postgres, MediaRow>(&format!(
            "SELECT {} FROM media WHERE album_id = $1 AND storage_key = $2",
            MEDIA_COLUMNS
        ))
        .bind(album_id)
        .bind(storage_key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MediaRecord::try_from).transpose()
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_media(&self, media_id: &str, update: &MediaUpdate) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE media SET
                status = CASE WHEN status = 'uploaded' THEN status ELSE $2 END,
                thumbnail_url = COALESCE($3, thumbnail_url),
                thumbnails = thumbnails || $4,
                display_url = COALESCE($5, display_url),
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(media_id)
        .bind(update.status.as_str())
        .bind(update.thumbnail_url.as_deref())
        .bind(Json(&update.thumbnails))
        .bind(update.display_url.as_deref())
        .bind(update.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("media {}", media_id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_user(&self, user_id: &str, update: &AvatarUpdate) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET avatar_url = $2, avatar_thumbnails = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(user_id)
        .bind(&update.avatar_url)
        .bind(Json(&update.thumbnails))
        .bind(update.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_album(&self, album_id: &str, update: &AlbumCoverUpdate) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE albums SET
                cover_url = COALESCE($2, cover_url),
                cover_thumbnails = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(album_id)
        .bind(update.cover_url.as_deref())
        .bind(Json(&update.thumbnails))
        .bind(update.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("album {}", album_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> MediaRow {
        let mut thumbnails = ThumbnailMap::new();
        thumbnails.insert("small".to_string(), "https://cdn/small.webp".to_string());
        MediaRow {
            id: "m1".to_string(),
            album_id: "abc123".to_string(),
            storage_key: "albums/abc123/media/photo.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            status: status.to_string(),
            thumbnail_url: None,
            thumbnails: Json(thumbnails),
            display_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn converts_rows_into_records() {
        let record = MediaRecord::try_from(row("uploaded")).unwrap();
        assert_eq!(record.status, MediaStatus::Uploaded);
        assert_eq!(record.thumbnails.len(), 1);
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(MediaRecord::try_from(row("archived")).is_err());
    }
}
