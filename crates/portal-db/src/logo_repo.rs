//! Repository for the site logo.

use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::info;

use portal_models::SiteLogo;

use crate::client::Database;
use crate::error::DbResult;

/// Repository for the logo configuration slot.
///
/// The logo is global mutable state with exactly one well-defined slot:
/// `set` always overwrites the same row, so there is never more than one
/// logo and never a dangling second record.
pub struct LogoRepository {
    db: Database,
}

impl LogoRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Current logo, if one has ever been set.
    pub async fn get(&self) -> DbResult<Option<SiteLogo>> {
        let row = sqlx::query("SELECT title, filename, updated_at FROM site_logo WHERE slot = 0")
            .fetch_optional(self.db.pool())
            .await?;
        row.map(|row| {
            Ok(SiteLogo {
                title: row.try_get("title")?,
                filename: row.try_get("filename")?,
                updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
            })
        })
        .transpose()
    }

    /// Set or replace the logo. Returns the stored state.
    pub async fn set(&self, title: &str, filename: &str) -> DbResult<SiteLogo> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO site_logo (slot, title, filename, updated_at) VALUES (0, ?, ?, ?)
             ON CONFLICT(slot) DO UPDATE SET
                 title = excluded.title,
                 filename = excluded.filename,
                 updated_at = excluded.updated_at",
        )
        .bind(title)
        .bind(filename)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        info!(title, filename, "site logo replaced");
        Ok(SiteLogo {
            title: title.to_string(),
            filename: filename.to_string(),
            updated_at: now,
        })
    }
}
