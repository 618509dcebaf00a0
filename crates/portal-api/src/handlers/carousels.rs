//! Public carousel handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use portal_db::CarouselRepository;
use portal_models::{Carousel, CarouselImage};
use portal_storage::CAROUSEL_COLLECTION;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Carousel image enriched with its public URL.
#[derive(Serialize)]
pub struct CarouselImageInfo {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub position: u32,
}

/// Response for a carousel's image listing.
#[derive(Serialize)]
pub struct CarouselImagesResponse {
    pub carousel: Carousel,
    pub images: Vec<CarouselImageInfo>,
}

/// Active carousels, most recently updated first.
pub async fn list_carousels(State(state): State<AppState>) -> ApiResult<Json<Vec<Carousel>>> {
    let carousels = CarouselRepository::new(state.db.clone()).list_active().await?;
    Ok(Json(carousels))
}

/// Images of one active carousel, in display order.
pub async fn carousel_images(
    State(state): State<AppState>,
    Path(carousel_id): Path<i64>,
) -> ApiResult<Json<CarouselImagesResponse>> {
    let repo = CarouselRepository::new(state.db.clone());

    let carousel = repo
        .get(carousel_id)
        .await?
        .filter(|c| c.active)
        .ok_or_else(|| ApiError::not_found(format!("carousel {}", carousel_id)))?;

    let images = repo
        .list_active_images(carousel_id)
        .await?
        .into_iter()
        .map(|image| image_info(&state, image))
        .collect();

    Ok(Json(CarouselImagesResponse { carousel, images }))
}

pub(crate) fn image_info(state: &AppState, image: CarouselImage) -> CarouselImageInfo {
    CarouselImageInfo {
        id: image.id,
        url: state.files.public_path(CAROUSEL_COLLECTION, &image.filename),
        title: image.title,
        position: image.position,
    }
}
