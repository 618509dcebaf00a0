//! Repository for gallery images.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;

use portal_models::GalleryImage;

use crate::client::Database;
use crate::error::{DbError, DbResult};

/// Repository for standalone gallery image records.
pub struct GalleryRepository {
    db: Database,
}

impl GalleryRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record an uploaded gallery image.
    pub async fn create(&self, title: &str, filename: &str, active: bool) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO gallery_images (title, filename, active, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(filename)
        .bind(active)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;
        info!(title, filename, "created gallery image");
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<GalleryImage>> {
        let row = sqlx::query(
            "SELECT id, title, filename, active, created_at FROM gallery_images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(gallery_image_from_row).transpose()
    }

    /// All gallery images, newest first.
    pub async fn list(&self) -> DbResult<Vec<GalleryImage>> {
        let rows = sqlx::query(
            "SELECT id, title, filename, active, created_at FROM gallery_images
             ORDER BY created_at DESC",
        )
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(gallery_image_from_row).collect()
    }

    /// Remove a gallery image record, returning its stored filename.
    pub async fn delete(&self, id: i64) -> DbResult<String> {
        let image = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found(format!("gallery image {}", id)))?;

        sqlx::query("DELETE FROM gallery_images WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(image.filename)
    }
}

fn gallery_image_from_row(row: &SqliteRow) -> DbResult<GalleryImage> {
    Ok(GalleryImage {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        filename: row.try_get("filename")?,
        active: row.try_get("active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
