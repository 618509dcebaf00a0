//! Application state.

use portal_db::Database;
use portal_storage::FileStore;

use crate::config::ApiConfig;

/// Shared application state.
///
/// Cloning is cheap: the database handle shares its pool and the file
/// store is a path.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub db: Database,
    pub files: FileStore,
}

impl AppState {
    /// Create new application state, connecting collaborators from the
    /// environment and preparing the schema.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::from_env().await?;
        db.init_schema().await?;
        let files = FileStore::from_env().await?;

        Ok(Self { config, db, files })
    }
}
