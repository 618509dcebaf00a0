//! Public page handlers.

use axum::extract::{Path, State};
use axum::Json;

use portal_db::PageRepository;
use portal_models::Page;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Page detail. Inactive pages stay reachable by id; only the menu
/// filters on the active flag.
pub async fn get_page(
    State(state): State<AppState>,
    Path(page_id): Path<i64>,
) -> ApiResult<Json<Page>> {
    let page = PageRepository::new(state.db.clone())
        .get(page_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("page {}", page_id)))?;
    Ok(Json(page))
}
