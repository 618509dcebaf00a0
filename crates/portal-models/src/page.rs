//! Static site pages.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A static content page. Active pages make up the site menu; inactive
/// pages stay addressable by id but are hidden from navigation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Page {
    pub id: i64,
    /// Page title, unique across the site
    pub title: String,
    /// Rich-text HTML body
    pub content: String,
    pub active: bool,
}

/// Fields accepted when creating or updating a page.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewPage {
    pub title: String,
    pub content: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
