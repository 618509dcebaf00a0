//! Site logo model.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The site logo: a configuration value with a single slot.
///
/// There is at most one logo; replacing it overwrites the slot in place.
/// It is never deleted, only replaced.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteLogo {
    pub title: String,
    /// Stored filename within the logo collection
    pub filename: String,
    pub updated_at: DateTime<Utc>,
}
