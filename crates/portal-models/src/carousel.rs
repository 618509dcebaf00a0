//! Image carousel models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named, orderable collection of images displayed as a rotating gallery.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Carousel {
    pub id: i64,
    /// Carousel name, unique across the site
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    /// Touched whenever the carousel or one of its images changes
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating a carousel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewCarousel {
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// One image belonging to a carousel.
///
/// The stored payload behind `filename` is always the normalized form:
/// a 250x250 RGB JPEG, regardless of what was uploaded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CarouselImage {
    pub id: i64,
    pub carousel_id: i64,
    pub title: String,
    /// Stored filename within the carousel collection
    pub filename: String,
    /// Display position; images are ordered by (position, created_at)
    pub position: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Metadata accepted alongside a carousel image upload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewCarouselImage {
    pub title: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
