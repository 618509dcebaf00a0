//! Post taxonomy: categories and tags.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A post category. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Short blurb shown alongside the category
    pub description: String,
}

/// Fields accepted when creating or updating a category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

/// A post tag. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Fields accepted when creating a tag.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewTag {
    pub name: String,
}
