//! General image gallery models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A standalone uploaded image. Stored exactly as uploaded; only carousel
/// images go through normalization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GalleryImage {
    pub id: i64,
    pub title: String,
    /// Stored filename within the gallery collection
    pub filename: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
