use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{
    ReferenceImageInsert, ReferenceImageRow, StyleFeatureInsert, StyleFeatureRecord,
    StyleFeatureRow,
};

const STYLE_FEATURE_COLUMNS: &str = "id, reference_image_id, camera_distance, camera_angle, \
     crop_type, light_type, tone_level, background_type, display_tags, raw_analysis, created_at";

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn init(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid DATABASE_URL {database_url}"))?
            .create_if_missing(true);

        let pool = if database_url.contains(":memory:") {
            // Every connection to :memory: is its own database; pin to one.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<std::time::Duration>)
                .max_lifetime(None::<std::time::Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sessions (\
                token TEXT PRIMARY KEY,\
                user_id TEXT NOT NULL,\
                created_at TEXT NOT NULL,\
                expires_at TEXT\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reference_images (\
                id TEXT PRIMARY KEY,\
                user_id TEXT NOT NULL,\
                image_url TEXT NOT NULL,\
                file_name TEXT NOT NULL,\
                file_size INTEGER NOT NULL DEFAULT 0,\
                created_at TEXT NOT NULL\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reference_style_features (\
                id TEXT PRIMARY KEY,\
                reference_image_id TEXT NOT NULL,\
                camera_distance TEXT NOT NULL,\
                camera_angle TEXT NOT NULL,\
                crop_type TEXT NOT NULL,\
                light_type TEXT NOT NULL,\
                tone_level TEXT NOT NULL,\
                background_type TEXT NOT NULL,\
                display_tags TEXT NOT NULL,\
                raw_analysis TEXT,\
                created_at TEXT NOT NULL,\
                FOREIGN KEY(reference_image_id) REFERENCES reference_images(id)\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_reference_images_user_id ON reference_images(user_id);",
        )
        .execute(&pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_style_features_reference ON reference_style_features(reference_image_id, created_at);",
        )
        .execute(&pool)
        .await?;

        info!("Database tables created successfully");

        Ok(Database { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn fetch_reference_image(
        &self,
        reference_image_id: &str,
        user_id: &str,
    ) -> Result<Option<ReferenceImageRow>> {
        let row = sqlx::query_as::<_, ReferenceImageRow>(
            "SELECT id, user_id, image_url, file_name, file_size, created_at \
             FROM reference_images WHERE id = ? AND user_id = ?",
        )
        .bind(reference_image_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_reference_image(
        &self,
        insert: ReferenceImageInsert,
    ) -> Result<ReferenceImageRow> {
        let row = ReferenceImageRow {
            id: Uuid::new_v4().to_string(),
            user_id: insert.user_id,
            image_url: insert.image_url,
            file_name: insert.file_name,
            file_size: insert.file_size,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO reference_images (id, user_id, image_url, file_name, file_size, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.image_url)
        .bind(&row.file_name)
        .bind(row.file_size)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn insert_style_feature(
        &self,
        insert: StyleFeatureInsert,
    ) -> Result<StyleFeatureRecord> {
        let display_tags = serde_json::to_string(&insert.display_tags)?;
        let record = StyleFeatureRecord {
            id: Uuid::new_v4().to_string(),
            reference_image_id: insert.reference_image_id,
            analysis: insert.analysis,
            labels: insert.analysis.labels(),
            display_tags: insert.display_tags,
            raw_analysis: insert.raw_analysis,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO reference_style_features (id, reference_image_id, camera_distance, camera_angle, \
             crop_type, light_type, tone_level, background_type, display_tags, raw_analysis, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.reference_image_id)
        .bind(record.analysis.camera_distance.as_str())
        .bind(record.analysis.camera_angle.as_str())
        .bind(record.analysis.crop_type.as_str())
        .bind(record.analysis.light_type.as_str())
        .bind(record.analysis.tone_level.as_str())
        .bind(record.analysis.background_type.as_str())
        .bind(display_tags)
        .bind(record.raw_analysis.as_deref())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn latest_style_feature(
        &self,
        reference_image_id: &str,
    ) -> Result<Option<StyleFeatureRecord>> {
        let row = sqlx::query_as::<_, StyleFeatureRow>(&format!(
            "SELECT {STYLE_FEATURE_COLUMNS} FROM reference_style_features \
             WHERE reference_image_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1"
        ))
        .bind(reference_image_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StyleFeatureRow::into_record).transpose()
    }

    #[cfg(test)]
    pub async fn count_style_features(&self, reference_image_id: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reference_style_features WHERE reference_image_id = ?",
        )
        .bind(reference_image_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    pub async fn create_session(&self, user_id: &str, ttl_hours: Option<i64>) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let expires_at = ttl_hours.map(|hours| now + ChronoDuration::hours(hours));

        sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(now)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    pub async fn find_session_user(&self, token: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT user_id FROM sessions WHERE token = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(user_id,)| user_id))
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
