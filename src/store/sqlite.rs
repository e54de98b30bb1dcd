//! SQLite 目录存储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::StoreError;
use crate::models::{NewVideo, VideoRecord, VideoStatus};
use crate::store::CatalogueStore;

/// SQLite 实现的视频目录存储
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// 打开（必要时创建）数据库并初始化表结构
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        debug!("数据库已打开: {}", path);
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS videos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                source_path TEXT NOT NULL,
                display_title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT '未发布',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_record(row: &SqliteRow) -> Result<VideoRecord, StoreError> {
        let status_text: String = row.try_get("status")?;
        let status: VideoStatus = status_text.parse()?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
        Ok(VideoRecord {
            id: row.try_get("id")?,
            filename: row.try_get("filename")?,
            source_path: row.try_get("source_path")?,
            display_title: row.try_get("display_title")?,
            description: row.try_get("description")?,
            status,
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl CatalogueStore for SqliteStore {
    async fn get(&self, id: i64) -> Result<VideoRecord, StoreError> {
        let row = sqlx::query("SELECT * FROM videos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(StoreError::NotFound { id }),
        }
    }

    async fn list(&self, status: Option<VideoStatus>) -> Result<Vec<VideoRecord>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM videos WHERE status = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM videos ORDER BY created_at DESC, id DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn add(&self, new: NewVideo) -> Result<VideoRecord, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO videos (filename, source_path, display_title, description, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.filename)
        .bind(&new.source_path)
        .bind(&new.display_title)
        .bind(&new.description)
        .bind(VideoStatus::Unpublished.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        let id = result.last_insert_rowid();
        Ok(VideoRecord {
            id,
            filename: new.filename,
            source_path: new.source_path,
            display_title: new.display_title,
            description: new.description,
            status: VideoStatus::Unpublished,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_path(&self, source_path: &str) -> Result<Option<VideoRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM videos WHERE source_path = ?")
            .bind(source_path)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn update_status(&self, id: i64, status: VideoStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE videos SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    async fn update_fields(
        &self,
        id: i64,
        display_title: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        // 先读后写，单条 UPDATE 保证原子性
        let current = self.get(id).await?;
        let title = display_title.unwrap_or(&current.display_title);
        let desc = description.unwrap_or(&current.description);
        sqlx::query(
            "UPDATE videos SET display_title = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(desc)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }
}
