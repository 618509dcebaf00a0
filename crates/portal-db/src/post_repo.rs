//! Repository for blog posts.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;

use portal_models::{Category, NewPost, Post, Tag};

use crate::client::Database;
use crate::error::{DbError, DbResult};

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: u32 = 5;

/// One page of the post listing.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Page actually served, after clamping
    pub page: u32,
    pub num_pages: u32,
    pub total: u32,
}

/// Repository for post records.
pub struct PostRepository {
    db: Database,
}

impl PostRepository {
    /// Create a new post repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a post, returning its id.
    pub async fn create(&self, post: &NewPost) -> DbResult<i64> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            "INSERT INTO posts (title, content, published_at, category_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.published_at)
        .bind(post.category_id)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        for tag_id in &post.tag_ids {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(id, title = %post.title, "created post");
        Ok(id)
    }

    /// Get a post by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Post>> {
        let row = sqlx::query(
            "SELECT p.id, p.title, p.content, p.published_at,
                    c.id AS cat_id, c.name AS cat_name, c.description AS cat_description
             FROM posts p
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE p.id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => {
                let mut post = post_from_row(&row)?;
                post.tags = self.load_tags(post.id).await?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    /// Update a post in place, replacing its tag set.
    pub async fn update(&self, id: i64, post: &NewPost) -> DbResult<()> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            "UPDATE posts SET title = ?, content = ?, published_at = ?, category_id = ? WHERE id = ?",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.published_at)
        .bind(post.category_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("post {}", id)));
        }

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for tag_id in &post.tag_ids {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a post.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("post {}", id)));
        }
        info!(id, "deleted post");
        Ok(())
    }

    /// List one page of posts, newest first.
    ///
    /// `query` filters by case-insensitive substring over title and
    /// content. `page` is clamped the way the original listing behaved:
    /// below 1 or past the end lands on the last page (callers map
    /// non-numeric input to 1 before getting here). An empty result set
    /// still has one (empty) page.
    pub async fn list_page(&self, query: Option<&str>, page: u32) -> DbResult<PostPage> {
        let pattern = query.map(|q| format!("%{}%", escape_like(&q.to_lowercase())));

        let total: u32 = match &pattern {
            Some(pattern) => sqlx::query_scalar(
                "SELECT COUNT(*) FROM posts
                 WHERE lower(title) LIKE ?1 ESCAPE '\\' OR lower(content) LIKE ?1 ESCAPE '\\'",
            )
            .bind(pattern)
            .fetch_one(self.db.pool())
            .await?,
            None => sqlx::query_scalar("SELECT COUNT(*) FROM posts")
                .fetch_one(self.db.pool())
                .await?,
        };

        let num_pages = (total.div_ceil(POSTS_PER_PAGE)).max(1);
        let page = if page < 1 || page > num_pages {
            num_pages
        } else {
            page
        };
        let offset = (page - 1) * POSTS_PER_PAGE;

        let select =
            "SELECT p.id, p.title, p.content, p.published_at,
                    c.id AS cat_id, c.name AS cat_name, c.description AS cat_description
             FROM posts p
             LEFT JOIN categories c ON c.id = p.category_id";
        let rows = match &pattern {
            Some(pattern) => sqlx::query(&format!(
                "{select}
                 WHERE lower(p.title) LIKE ?1 ESCAPE '\\' OR lower(p.content) LIKE ?1 ESCAPE '\\'
                 ORDER BY p.published_at DESC
                 LIMIT ?2 OFFSET ?3"
            ))
            .bind(pattern)
            .bind(POSTS_PER_PAGE)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?,
            None => sqlx::query(&format!(
                "{select}
                 ORDER BY p.published_at DESC
                 LIMIT ?1 OFFSET ?2"
            ))
            .bind(POSTS_PER_PAGE)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?,
        };

        let mut posts = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut post = post_from_row(row)?;
            post.tags = self.load_tags(post.id).await?;
            posts.push(post);
        }

        Ok(PostPage {
            posts,
            page,
            num_pages,
            total,
        })
    }

    async fn load_tags(&self, post_id: i64) -> DbResult<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name FROM tags t
             JOIN post_tags pt ON pt.tag_id = t.id
             WHERE pt.post_id = ?
             ORDER BY t.name",
        )
        .bind(post_id)
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
}

fn post_from_row(row: &SqliteRow) -> DbResult<Post> {
    let category = match row.try_get::<Option<i64>, _>("cat_id")? {
        Some(id) => Some(Category {
            id,
            name: row.try_get("cat_name")?,
            description: row.try_get("cat_description")?,
        }),
        None => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        published_at: row.try_get::<DateTime<Utc>, _>("published_at")?,
        category,
        tags: Vec::new(),
    })
}

/// Escape LIKE wildcards in user-supplied search terms.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy_repo::TaxonomyRepository;
    use portal_models::{NewCategory, NewTag};

    async fn db() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        db
    }

    fn new_post(title: &str, content: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: content.to_string(),
            published_at: Utc::now(),
            category_id: None,
            tag_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_get_roundtrip_with_taxonomy() {
        let db = db().await;
        let taxonomy = TaxonomyRepository::new(db.clone());
        let category_id = taxonomy
            .create_category(&NewCategory {
                name: "Notices".to_string(),
                description: "Official notices".to_string(),
            })
            .await
            .unwrap();
        let tag_id = taxonomy
            .create_tag(&NewTag {
                name: "urgent".to_string(),
            })
            .await
            .unwrap();

        let repo = PostRepository::new(db);
        let mut post = new_post("Road works", "<p>Schedule</p>");
        post.category_id = Some(category_id);
        post.tag_ids = vec![tag_id];
        let id = repo.create(&post).await.unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Road works");
        assert_eq!(stored.category.unwrap().name, "Notices");
        assert_eq!(stored.tags.len(), 1);
        assert_eq!(stored.tags[0].name, "urgent");
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let repo = PostRepository::new(db().await);
        assert!(repo.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_pages_are_clamped() {
        let db = db().await;
        let repo = PostRepository::new(db);
        for i in 0..12 {
            let mut post = new_post(&format!("Post {i}"), "body");
            // Spread publication times so ordering is deterministic
            post.published_at = Utc::now() - chrono::Duration::minutes(12 - i);
            repo.create(&post).await.unwrap();
        }

        let first = repo.list_page(None, 1).await.unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.num_pages, 3);
        assert_eq!(first.posts.len(), 5);
        // Newest first
        assert_eq!(first.posts[0].title, "Post 11");

        let last = repo.list_page(None, 3).await.unwrap();
        assert_eq!(last.posts.len(), 2);

        // Past-the-end and below-1 land on the last page
        assert_eq!(repo.list_page(None, 99).await.unwrap().page, 3);
        assert_eq!(repo.list_page(None, 0).await.unwrap().page, 3);
    }

    #[tokio::test]
    async fn empty_listing_still_has_one_page() {
        let repo = PostRepository::new(db().await);
        let page = repo.list_page(None, 1).await.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.num_pages, 1);
        assert!(page.posts.is_empty());
    }

    #[tokio::test]
    async fn search_matches_title_and_content_case_insensitively() {
        let repo = PostRepository::new(db().await);
        repo.create(&new_post("Carnival parade", "streets close early"))
            .await
            .unwrap();
        repo.create(&new_post("Budget hearing", "the CARNIVAL budget too"))
            .await
            .unwrap();
        repo.create(&new_post("Unrelated", "nothing here"))
            .await
            .unwrap();

        let found = repo.list_page(Some("carnival"), 1).await.unwrap();
        assert_eq!(found.total, 2);

        let none = repo.list_page(Some("zeppelin"), 1).await.unwrap();
        assert_eq!(none.total, 0);
    }

    #[tokio::test]
    async fn search_wildcards_are_literal() {
        let repo = PostRepository::new(db().await);
        repo.create(&new_post("Discount 100%", "sale")).await.unwrap();
        repo.create(&new_post("Discount 100", "sale")).await.unwrap();

        let found = repo.list_page(Some("100%"), 1).await.unwrap();
        assert_eq!(found.total, 1);
    }

    #[tokio::test]
    async fn update_replaces_tags_and_delete_removes() {
        let db = db().await;
        let taxonomy = TaxonomyRepository::new(db.clone());
        let a = taxonomy
            .create_tag(&NewTag { name: "a".to_string() })
            .await
            .unwrap();
        let b = taxonomy
            .create_tag(&NewTag { name: "b".to_string() })
            .await
            .unwrap();

        let repo = PostRepository::new(db);
        let mut post = new_post("Original", "body");
        post.tag_ids = vec![a];
        let id = repo.create(&post).await.unwrap();

        post.title = "Edited".to_string();
        post.tag_ids = vec![b];
        repo.update(id, &post).await.unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Edited");
        assert_eq!(stored.tags.len(), 1);
        assert_eq!(stored.tags[0].name, "b");

        repo.delete(id).await.unwrap();
        assert!(repo.get(id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(id).await.unwrap_err(),
            DbError::NotFound(_)
        ));
    }
}
