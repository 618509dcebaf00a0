//! Repository for carousels and their images.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;

use portal_models::{Carousel, CarouselImage, NewCarousel, NewCarouselImage};

use crate::client::Database;
use crate::error::{map_unique, DbError, DbResult};

/// Repository for carousel records.
pub struct CarouselRepository {
    db: Database,
}

impl CarouselRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a carousel. Duplicate names are a conflict.
    pub async fn create(&self, carousel: &NewCarousel) -> DbResult<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO carousels (name, active, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&carousel.name)
        .bind(carousel.active)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await
        .map_err(|e| map_unique(e, "carousel"))?;
        info!(name = %carousel.name, "created carousel");
        Ok(result.last_insert_rowid())
    }

    /// Get a carousel by id, active or not.
    pub async fn get(&self, id: i64) -> DbResult<Option<Carousel>> {
        let row = sqlx::query(
            "SELECT id, name, active, created_at, updated_at FROM carousels WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(carousel_from_row).transpose()
    }

    pub async fn update(&self, id: i64, carousel: &NewCarousel) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE carousels SET name = ?, active = ?, updated_at = ? WHERE id = ?")
                .bind(&carousel.name)
                .bind(carousel.active)
                .bind(Utc::now())
                .bind(id)
                .execute(self.db.pool())
                .await
                .map_err(|e| map_unique(e, "carousel"))?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("carousel {}", id)));
        }
        Ok(())
    }

    /// Delete a carousel and, via cascade, its image records. Returns the
    /// stored filenames of the removed images so callers can drop the
    /// payloads too.
    pub async fn delete(&self, id: i64) -> DbResult<Vec<String>> {
        let filenames: Vec<String> =
            sqlx::query_scalar("SELECT filename FROM carousel_images WHERE carousel_id = ?")
                .bind(id)
                .fetch_all(self.db.pool())
                .await?;

        let result = sqlx::query("DELETE FROM carousels WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("carousel {}", id)));
        }
        info!(id, images = filenames.len(), "deleted carousel");
        Ok(filenames)
    }

    /// Active carousels, most recently updated first.
    pub async fn list_active(&self) -> DbResult<Vec<Carousel>> {
        let rows = sqlx::query(
            "SELECT id, name, active, created_at, updated_at FROM carousels
             WHERE active = 1 ORDER BY updated_at DESC",
        )
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(carousel_from_row).collect()
    }

    pub async fn list_all(&self) -> DbResult<Vec<Carousel>> {
        let rows = sqlx::query(
            "SELECT id, name, active, created_at, updated_at FROM carousels ORDER BY name",
        )
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(carousel_from_row).collect()
    }

    /// Attach an image record to a carousel, touching the parent's
    /// `updated_at`. The filename must already point at a stored,
    /// normalized payload.
    pub async fn add_image(
        &self,
        carousel_id: i64,
        image: &NewCarouselImage,
        filename: &str,
    ) -> DbResult<i64> {
        let mut tx = self.db.pool().begin().await?;

        let touched = sqlx::query("UPDATE carousels SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(carousel_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(DbError::not_found(format!("carousel {}", carousel_id)));
        }

        let result = sqlx::query(
            "INSERT INTO carousel_images (carousel_id, title, filename, position, active, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(carousel_id)
        .bind(&image.title)
        .bind(filename)
        .bind(image.position)
        .bind(image.active)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        let id = result.last_insert_rowid();
        info!(carousel_id, image_id = id, filename, "added carousel image");
        Ok(id)
    }

    pub async fn get_image(&self, carousel_id: i64, image_id: i64) -> DbResult<Option<CarouselImage>> {
        let row = sqlx::query(
            "SELECT id, carousel_id, title, filename, position, active, created_at
             FROM carousel_images WHERE id = ? AND carousel_id = ?",
        )
        .bind(image_id)
        .bind(carousel_id)
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(image_from_row).transpose()
    }

    /// Active images of a carousel in display order.
    pub async fn list_active_images(&self, carousel_id: i64) -> DbResult<Vec<CarouselImage>> {
        let rows = sqlx::query(
            "SELECT id, carousel_id, title, filename, position, active, created_at
             FROM carousel_images
             WHERE carousel_id = ? AND active = 1
             ORDER BY position, created_at",
        )
        .bind(carousel_id)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(image_from_row).collect()
    }

    /// Remove an image record, returning its stored filename.
    pub async fn delete_image(&self, carousel_id: i64, image_id: i64) -> DbResult<String> {
        let image = self
            .get_image(carousel_id, image_id)
            .await?
            .ok_or_else(|| DbError::not_found(format!("carousel image {}", image_id)))?;

        sqlx::query("DELETE FROM carousel_images WHERE id = ?")
            .bind(image_id)
            .execute(self.db.pool())
            .await?;
        info!(carousel_id, image_id, "deleted carousel image");
        Ok(image.filename)
    }
}

fn carousel_from_row(row: &SqliteRow) -> DbResult<Carousel> {
    Ok(Carousel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        active: row.try_get("active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn image_from_row(row: &SqliteRow) -> DbResult<CarouselImage> {
    Ok(CarouselImage {
        id: row.try_get("id")?,
        carousel_id: row.try_get("carousel_id")?,
        title: row.try_get("title")?,
        filename: row.try_get("filename")?,
        position: row.try_get("position")?,
        active: row.try_get("active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> CarouselRepository {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        CarouselRepository::new(db)
    }

    fn image(title: &str, position: u32) -> NewCarouselImage {
        NewCarouselImage {
            title: title.to_string(),
            position,
            active: true,
        }
    }

    #[tokio::test]
    async fn images_come_back_in_display_order() {
        let repo = repo().await;
        let carousel_id = repo
            .create(&NewCarousel {
                name: "Home".to_string(),
                active: true,
            })
            .await
            .unwrap();

        repo.add_image(carousel_id, &image("second", 2), "b.jpg")
            .await
            .unwrap();
        repo.add_image(carousel_id, &image("first", 1), "a.jpg")
            .await
            .unwrap();
        let mut inactive = image("hidden", 0);
        inactive.active = false;
        repo.add_image(carousel_id, &inactive, "c.jpg").await.unwrap();

        let images = repo.list_active_images(carousel_id).await.unwrap();
        let titles: Vec<&str> = images.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn adding_an_image_touches_the_parent() {
        let repo = repo().await;
        let carousel_id = repo
            .create(&NewCarousel {
                name: "Home".to_string(),
                active: true,
            })
            .await
            .unwrap();
        let before = repo.get(carousel_id).await.unwrap().unwrap().updated_at;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.add_image(carousel_id, &image("img", 0), "a.jpg")
            .await
            .unwrap();

        let after = repo.get(carousel_id).await.unwrap().unwrap().updated_at;
        assert!(after > before);
    }

    #[tokio::test]
    async fn add_image_to_missing_carousel_is_not_found() {
        let repo = repo().await;
        let err = repo
            .add_image(999, &image("img", 0), "a.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_returns_filenames_for_cleanup() {
        let repo = repo().await;
        let carousel_id = repo
            .create(&NewCarousel {
                name: "Home".to_string(),
                active: true,
            })
            .await
            .unwrap();
        repo.add_image(carousel_id, &image("a", 0), "a.jpg").await.unwrap();
        let image_id = repo
            .add_image(carousel_id, &image("b", 1), "b.jpg")
            .await
            .unwrap();

        let filename = repo.delete_image(carousel_id, image_id).await.unwrap();
        assert_eq!(filename, "b.jpg");

        let filenames = repo.delete(carousel_id).await.unwrap();
        assert_eq!(filenames, vec!["a.jpg"]);
    }

    #[tokio::test]
    async fn active_listing_orders_by_recency() {
        let repo = repo().await;
        let first = repo
            .create(&NewCarousel {
                name: "First".to_string(),
                active: true,
            })
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.create(&NewCarousel {
            name: "Second".to_string(),
            active: true,
        })
        .await
        .unwrap();
        repo.create(&NewCarousel {
            name: "Hidden".to_string(),
            active: false,
        })
        .await
        .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        // Touch the older carousel; it should move to the front
        repo.add_image(first, &image("img", 0), "a.jpg").await.unwrap();

        let names: Vec<String> = repo
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
