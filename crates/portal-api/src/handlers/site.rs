//! Global site context handler.

use axum::extract::State;
use axum::Json;
use chrono::{Datelike, Utc};
use serde::Serialize;

use portal_db::{LogoRepository, PageRepository};
use portal_storage::LOGO_COLLECTION;

use crate::error::ApiResult;
use crate::state::AppState;

/// Context shared by every rendered view: site identity, navigation and
/// the logo.
#[derive(Serialize)]
pub struct SiteContextResponse {
    pub site_name: String,
    pub current_year: i32,
    pub menu_pages: Vec<MenuPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoInfo>,
}

#[derive(Serialize)]
pub struct MenuPage {
    pub id: i64,
    pub title: String,
}

#[derive(Serialize)]
pub struct LogoInfo {
    pub title: String,
    pub url: String,
    pub updated_at: String,
}

/// Global site context: name, year, menu of active pages, logo.
pub async fn site_context(State(state): State<AppState>) -> ApiResult<Json<SiteContextResponse>> {
    let menu_pages = PageRepository::new(state.db.clone())
        .list_active()
        .await?
        .into_iter()
        .map(|p| MenuPage {
            id: p.id,
            title: p.title,
        })
        .collect();

    let logo = LogoRepository::new(state.db.clone())
        .get()
        .await?
        .map(|logo| LogoInfo {
            url: state.files.public_path(LOGO_COLLECTION, &logo.filename),
            title: logo.title,
            updated_at: logo.updated_at.to_rfc3339(),
        });

    Ok(Json(SiteContextResponse {
        site_name: state.config.site_name.clone(),
        current_year: Utc::now().year(),
        menu_pages,
        logo,
    }))
}
