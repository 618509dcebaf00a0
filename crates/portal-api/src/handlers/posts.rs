//! Public post handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use portal_db::PostRepository;
use portal_models::Post;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query string for the post listing.
#[derive(Deserialize)]
pub struct ListPostsQuery {
    /// Search term over title and content
    pub q: Option<String>,
    /// Requested page; kept as text so junk input degrades gracefully
    pub page: Option<String>,
}

/// One page of the post listing.
#[derive(Serialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub page: u32,
    pub num_pages: u32,
    pub total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// List posts, newest first, optionally filtered by a search term.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<Json<PostListResponse>> {
    let term = query.q.as_deref().filter(|q| !q.is_empty());
    let page = page_number(query.page.as_deref());

    let result = PostRepository::new(state.db.clone())
        .list_page(term, page)
        .await?;

    Ok(Json(PostListResponse {
        posts: result.posts,
        page: result.page,
        num_pages: result.num_pages,
        total: result.total,
        query: term.map(|t| t.to_string()),
    }))
}

/// Post detail.
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<Post>> {
    let post = PostRepository::new(state.db.clone())
        .get(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("post {}", post_id)))?;
    Ok(Json(post))
}

/// Interpret the raw `page` parameter the way the original listing did:
/// absent or non-numeric input means the first page, while a numeric page
/// below 1 is clamped (by the repository) to the last page.
fn page_number(param: Option<&str>) -> u32 {
    match param {
        None => 1,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(n) if n < 1 => 0,
            Ok(n) => n.min(i64::from(u32::MAX)) as u32,
            Err(_) => 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junk_page_numbers_mean_first_page() {
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some("abc")), 1);
        assert_eq!(page_number(Some("")), 1);
        assert_eq!(page_number(Some("2")), 2);
    }

    #[test]
    fn below_one_is_clamp_to_last_sentinel() {
        assert_eq!(page_number(Some("0")), 0);
        assert_eq!(page_number(Some("-3")), 0);
    }
}
