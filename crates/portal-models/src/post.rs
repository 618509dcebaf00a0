//! Blog post models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::taxonomy::{Category, Tag};

/// A published blog post.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Post {
    /// Database id
    pub id: i64,

    /// Post title
    pub title: String,

    /// Rich-text HTML body
    pub content: String,

    /// Publication timestamp; listings are ordered newest-first on this
    pub published_at: DateTime<Utc>,

    /// Owning category, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Attached tags
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Fields accepted when creating or updating a post.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}
