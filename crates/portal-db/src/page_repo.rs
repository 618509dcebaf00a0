//! Repository for static pages.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;

use portal_models::{NewPage, Page};

use crate::client::Database;
use crate::error::{map_unique, DbError, DbResult};

/// Repository for page records.
pub struct PageRepository {
    db: Database,
}

impl PageRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a page. Duplicate titles are a conflict.
    pub async fn create(&self, page: &NewPage) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO pages (title, content, active) VALUES (?, ?, ?)")
            .bind(&page.title)
            .bind(&page.content)
            .bind(page.active)
            .execute(self.db.pool())
            .await
            .map_err(|e| map_unique(e, "page"))?;
        info!(title = %page.title, "created page");
        Ok(result.last_insert_rowid())
    }

    /// Get a page by id, active or not.
    pub async fn get(&self, id: i64) -> DbResult<Option<Page>> {
        let row = sqlx::query("SELECT id, title, content, active FROM pages WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(page_from_row).transpose()
    }

    pub async fn update(&self, id: i64, page: &NewPage) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE pages SET title = ?, content = ?, active = ? WHERE id = ?")
                .bind(&page.title)
                .bind(&page.content)
                .bind(page.active)
                .bind(id)
                .execute(self.db.pool())
                .await
                .map_err(|e| map_unique(e, "page"))?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("page {}", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("page {}", id)));
        }
        Ok(())
    }

    /// Pages that appear in the site menu.
    pub async fn list_active(&self) -> DbResult<Vec<Page>> {
        let rows =
            sqlx::query("SELECT id, title, content, active FROM pages WHERE active = 1 ORDER BY title")
                .fetch_all(self.db.pool())
                .await?;
        rows.iter().map(page_from_row).collect()
    }

    pub async fn list_all(&self) -> DbResult<Vec<Page>> {
        let rows = sqlx::query("SELECT id, title, content, active FROM pages ORDER BY title")
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(page_from_row).collect()
    }
}

fn page_from_row(row: &SqliteRow) -> DbResult<Page> {
    Ok(Page {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        active: row.try_get("active")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> PageRepository {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        PageRepository::new(db)
    }

    #[tokio::test]
    async fn inactive_pages_stay_addressable_but_leave_the_menu() {
        let repo = repo().await;
        let id = repo
            .create(&NewPage {
                title: "About".to_string(),
                content: "<p>About us</p>".to_string(),
                active: true,
            })
            .await
            .unwrap();
        repo.create(&NewPage {
            title: "Archive".to_string(),
            content: String::new(),
            active: false,
        })
        .await
        .unwrap();

        let menu = repo.list_active().await.unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].title, "About");

        // Direct fetch works regardless of the active flag
        repo.update(
            id,
            &NewPage {
                title: "About".to_string(),
                content: "<p>About us</p>".to_string(),
                active: false,
            },
        )
        .await
        .unwrap();
        assert!(repo.get(id).await.unwrap().is_some());
        assert!(repo.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_titles_conflict() {
        let repo = repo().await;
        let page = NewPage {
            title: "Contact".to_string(),
            content: String::new(),
            active: true,
        };
        repo.create(&page).await.unwrap();
        assert!(matches!(
            repo.create(&page).await.unwrap_err(),
            DbError::Conflict(_)
        ));
    }
}
