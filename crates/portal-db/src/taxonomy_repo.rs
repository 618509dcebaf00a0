//! Repository for post categories and tags.

use sqlx::Row;
use tracing::info;

use portal_models::{Category, NewCategory, NewTag, Tag};

use crate::client::Database;
use crate::error::{map_unique, DbError, DbResult};

/// Repository for taxonomy records.
pub struct TaxonomyRepository {
    db: Database,
}

impl TaxonomyRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a category. Duplicate names are a conflict.
    pub async fn create_category(&self, category: &NewCategory) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
            .bind(&category.name)
            .bind(&category.description)
            .execute(self.db.pool())
            .await
            .map_err(|e| map_unique(e, "category"))?;
        info!(name = %category.name, "created category");
        Ok(result.last_insert_rowid())
    }

    pub async fn get_category(&self, id: i64) -> DbResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, description FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        row.map(|row| {
            Ok(Category {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
            })
        })
        .transpose()
    }

    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, description FROM categories ORDER BY name")
            .fetch_all(self.db.pool())
            .await?;
        rows.iter()
            .map(|row| {
                Ok(Category {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }

    pub async fn update_category(&self, id: i64, category: &NewCategory) -> DbResult<()> {
        let result = sqlx::query("UPDATE categories SET name = ?, description = ? WHERE id = ?")
            .bind(&category.name)
            .bind(&category.description)
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(|e| map_unique(e, "category"))?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("category {}", id)));
        }
        Ok(())
    }

    /// Delete a category. Posts under it go with it.
    pub async fn delete_category(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("category {}", id)));
        }
        Ok(())
    }

    /// Create a tag. Duplicate names are a conflict.
    pub async fn create_tag(&self, tag: &NewTag) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(&tag.name)
            .execute(self.db.pool())
            .await
            .map_err(|e| map_unique(e, "tag"))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_tags(&self) -> DbResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(self.db.pool())
            .await?;
        rows.iter()
            .map(|row| {
                Ok(Tag {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    pub async fn delete_tag(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("tag {}", id)));
        }
        Ok(())
    }
}
