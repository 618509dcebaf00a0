//! Admin content-management handlers.
//!
//! Everything under `/api/admin`. There is no authentication layer here;
//! deployments are expected to gate these routes upstream.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use portal_db::{
    CarouselRepository, GalleryRepository, LogoRepository, PageRepository, PostRepository,
    RequestRepository, TaxonomyRepository,
};
use portal_media::{normalize_carousel_image, MediaError};
use portal_models::{
    Carousel, Category, CitizenRequest, GalleryImage, NewCarousel, NewCarouselImage, NewCategory,
    NewPage, NewPost, NewTag, Page, Tag,
};
use portal_storage::{CAROUSEL_COLLECTION, GALLERY_COLLECTION, LOGO_COLLECTION};

use crate::error::{ApiError, ApiResult};
use crate::handlers::carousels::{image_info, CarouselImageInfo};
use crate::handlers::site::LogoInfo;
use crate::metrics;
use crate::state::AppState;

/// Response carrying a freshly created id.
#[derive(Serialize)]
pub struct IdResponse {
    pub id: i64,
}

/// Generic acknowledgement.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn ack(message: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: message.into(),
    })
}

// ---- Posts ----

pub async fn create_post(
    State(state): State<AppState>,
    Json(post): Json<NewPost>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    if post.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    let id = PostRepository::new(state.db.clone()).create(&post).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(post): Json<NewPost>,
) -> ApiResult<Json<MessageResponse>> {
    PostRepository::new(state.db.clone())
        .update(post_id, &post)
        .await?;
    Ok(ack("post updated"))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    PostRepository::new(state.db.clone()).delete(post_id).await?;
    Ok(ack("post deleted"))
}

// ---- Categories and tags ----

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(
        TaxonomyRepository::new(state.db.clone()).list_categories().await?,
    ))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(category): Json<NewCategory>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let id = TaxonomyRepository::new(state.db.clone())
        .create_category(&category)
        .await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(category): Json<NewCategory>,
) -> ApiResult<Json<MessageResponse>> {
    TaxonomyRepository::new(state.db.clone())
        .update_category(category_id, &category)
        .await?;
    Ok(ack("category updated"))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    TaxonomyRepository::new(state.db.clone())
        .delete_category(category_id)
        .await?;
    Ok(ack("category deleted"))
}

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(TaxonomyRepository::new(state.db.clone()).list_tags().await?))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Json(tag): Json<NewTag>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let id = TaxonomyRepository::new(state.db.clone()).create_tag(&tag).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    TaxonomyRepository::new(state.db.clone()).delete_tag(tag_id).await?;
    Ok(ack("tag deleted"))
}

// ---- Pages ----

pub async fn list_pages(State(state): State<AppState>) -> ApiResult<Json<Vec<Page>>> {
    Ok(Json(PageRepository::new(state.db.clone()).list_all().await?))
}

pub async fn create_page(
    State(state): State<AppState>,
    Json(page): Json<NewPage>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    if page.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    let id = PageRepository::new(state.db.clone()).create(&page).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn update_page(
    State(state): State<AppState>,
    Path(page_id): Path<i64>,
    Json(page): Json<NewPage>,
) -> ApiResult<Json<MessageResponse>> {
    PageRepository::new(state.db.clone()).update(page_id, &page).await?;
    Ok(ack("page updated"))
}

pub async fn delete_page(
    State(state): State<AppState>,
    Path(page_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    PageRepository::new(state.db.clone()).delete(page_id).await?;
    Ok(ack("page deleted"))
}

// ---- Carousels ----

pub async fn list_all_carousels(State(state): State<AppState>) -> ApiResult<Json<Vec<Carousel>>> {
    Ok(Json(CarouselRepository::new(state.db.clone()).list_all().await?))
}

pub async fn create_carousel(
    State(state): State<AppState>,
    Json(carousel): Json<NewCarousel>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    if carousel.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let id = CarouselRepository::new(state.db.clone()).create(&carousel).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn update_carousel(
    State(state): State<AppState>,
    Path(carousel_id): Path<i64>,
    Json(carousel): Json<NewCarousel>,
) -> ApiResult<Json<MessageResponse>> {
    CarouselRepository::new(state.db.clone())
        .update(carousel_id, &carousel)
        .await?;
    Ok(ack("carousel updated"))
}

/// Delete a carousel, its image records and their stored payloads.
pub async fn delete_carousel(
    State(state): State<AppState>,
    Path(carousel_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let filenames = CarouselRepository::new(state.db.clone())
        .delete(carousel_id)
        .await?;
    for filename in filenames {
        if let Err(e) = state.files.delete(CAROUSEL_COLLECTION, &filename).await {
            warn!(filename, error = %e, "failed to remove carousel image payload");
        }
    }
    Ok(ack("carousel deleted"))
}

/// Upload a carousel image.
///
/// Multipart fields: `image` (the file, required), `title` (required),
/// `position`, `active`. The payload is normalized to a 250x250 RGB JPEG
/// before anything is stored; an undecodable upload rejects the save and
/// nothing is written.
pub async fn upload_carousel_image(
    State(state): State<AppState>,
    Path(carousel_id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<CarouselImageInfo>)> {
    let repo = CarouselRepository::new(state.db.clone());
    repo.get(carousel_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("carousel {}", carousel_id)))?;

    let upload = read_upload(multipart).await?;
    let file = upload.require_file()?;
    let title = upload.require_text("title")?;
    let image = NewCarouselImage {
        title,
        position: upload.parse_u32("position")?.unwrap_or(0),
        active: upload.parse_bool("active").unwrap_or(true),
    };

    let normalized = normalize_carousel_image(&file.bytes).map_err(|e| match e {
        MediaError::Decode(_) => {
            metrics::record_image_rejected();
            ApiError::validation("Invalid or unsupported image file")
        }
        other => ApiError::internal(other.to_string()),
    })?;
    metrics::record_image_normalized();

    // The normalized payload keeps the uploaded filename; only the bytes
    // are replaced.
    let stored = state
        .files
        .put_bytes(CAROUSEL_COLLECTION, &file.filename, &normalized)
        .await?;

    let image_id = match repo.add_image(carousel_id, &image, &stored).await {
        Ok(id) => id,
        Err(e) => {
            // Don't leave an orphan payload behind
            let _ = state.files.delete(CAROUSEL_COLLECTION, &stored).await;
            return Err(e.into());
        }
    };

    let stored_image = repo
        .get_image(carousel_id, image_id)
        .await?
        .ok_or_else(|| ApiError::internal("stored image vanished"))?;
    Ok((StatusCode::CREATED, Json(image_info(&state, stored_image))))
}

pub async fn delete_carousel_image(
    State(state): State<AppState>,
    Path((carousel_id, image_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let filename = CarouselRepository::new(state.db.clone())
        .delete_image(carousel_id, image_id)
        .await?;
    if let Err(e) = state.files.delete(CAROUSEL_COLLECTION, &filename).await {
        warn!(filename, error = %e, "failed to remove carousel image payload");
    }
    Ok(ack("carousel image deleted"))
}

// ---- Gallery ----

pub async fn list_gallery_images(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<GalleryImage>>> {
    Ok(Json(GalleryRepository::new(state.db.clone()).list().await?))
}

/// Upload a gallery image. Stored exactly as uploaded.
pub async fn upload_gallery_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let upload = read_upload(multipart).await?;
    let file = upload.require_file()?;
    let title = upload.require_text("title")?;
    let active = upload.parse_bool("active").unwrap_or(true);

    let stored = state
        .files
        .put_bytes(GALLERY_COLLECTION, &file.filename, &file.bytes)
        .await?;
    let id = GalleryRepository::new(state.db.clone())
        .create(&title, &stored, active)
        .await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn delete_gallery_image(
    State(state): State<AppState>,
    Path(image_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let filename = GalleryRepository::new(state.db.clone()).delete(image_id).await?;
    if let Err(e) = state.files.delete(GALLERY_COLLECTION, &filename).await {
        warn!(filename, error = %e, "failed to remove gallery image payload");
    }
    Ok(ack("gallery image deleted"))
}

// ---- Logo ----

/// Set or replace the site logo. Always lands on the single logo slot;
/// the file is stored as uploaded.
pub async fn set_logo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<LogoInfo>> {
    let upload = read_upload(multipart).await?;
    let file = upload.require_file()?;
    let title = upload
        .text("title")
        .unwrap_or_else(|| "Site Logo".to_string());

    let stored = state
        .files
        .put_bytes(LOGO_COLLECTION, &file.filename, &file.bytes)
        .await?;
    let logo = LogoRepository::new(state.db.clone()).set(&title, &stored).await?;

    Ok(Json(LogoInfo {
        url: state.files.public_path(LOGO_COLLECTION, &logo.filename),
        title: logo.title,
        updated_at: logo.updated_at.to_rfc3339(),
    }))
}

// ---- Citizen requests ----

pub async fn list_requests(State(state): State<AppState>) -> ApiResult<Json<Vec<CitizenRequest>>> {
    Ok(Json(RequestRepository::new(state.db.clone()).list().await?))
}

// ---- Multipart plumbing ----

struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

/// Text fields plus the single `image` file of a multipart upload.
struct Upload {
    fields: std::collections::HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl Upload {
    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require_text(&self, name: &str) -> ApiResult<String> {
        self.text(name)
            .ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))
    }

    fn require_file(&self) -> ApiResult<&UploadedFile> {
        self.file
            .as_ref()
            .ok_or_else(|| ApiError::bad_request("image file is required"))
    }

    fn parse_u32(&self, name: &str) -> ApiResult<Option<u32>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<u32>()
                .map(Some)
                .map_err(|_| ApiError::bad_request(format!("{} must be a non-negative number", name))),
        }
    }

    fn parse_bool(&self, name: &str) -> Option<bool> {
        self.text(name)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "on" | "yes"))
    }
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    let mut upload = Upload {
        fields: std::collections::HashMap::new(),
        file: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let filename = field
                .file_name()
                .map(strip_path_components)
                .filter(|f| !f.is_empty())
                .ok_or_else(|| ApiError::bad_request("image field must carry a filename"))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read image field: {}", e)))?
                .to_vec();
            upload.file = Some(UploadedFile { filename, bytes });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read {} field: {}", name, e)))?;
            upload.fields.insert(name, value);
        }
    }

    Ok(upload)
}

/// Browsers may send a full path in the filename; keep only the last
/// component.
fn strip_path_components(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_lose_their_path_components() {
        assert_eq!(strip_path_components("C:\\Users\\me\\praia.png"), "praia.png");
        assert_eq!(strip_path_components("/tmp/praia.png"), "praia.png");
        assert_eq!(strip_path_components("praia.png"), "praia.png");
    }
}
