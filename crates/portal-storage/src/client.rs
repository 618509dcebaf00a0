//! Local media file store.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Collection for normalized carousel images.
pub const CAROUSEL_COLLECTION: &str = "carousel";
/// Collection for the site logo.
pub const LOGO_COLLECTION: &str = "logo";
/// Collection for general gallery images.
pub const GALLERY_COLLECTION: &str = "gallery";

/// Configuration for the file store.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Root directory under which all collections live
    pub root: PathBuf,
}

impl FileStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        if root.trim().is_empty() {
            return Err(StorageError::config_error("MEDIA_ROOT must not be empty"));
        }
        Ok(Self {
            root: PathBuf::from(root),
        })
    }
}

/// File store for uploaded media, keyed by (collection, filename).
///
/// Collections are flat directories under the media root; keys never
/// contain path separators, so stored files cannot escape their
/// collection.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store, ensuring the root directory exists.
    pub async fn new(config: FileStoreConfig) -> StorageResult<Self> {
        tokio::fs::create_dir_all(&config.root).await?;
        info!("File store root: {}", config.root.display());
        Ok(Self { root: config.root })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = FileStoreConfig::from_env()?;
        Self::new(config).await
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store bytes under a collection, returning the stored filename.
    ///
    /// If the requested name is already taken, a short unique suffix is
    /// inserted before the extension rather than overwriting.
    pub async fn put_bytes(
        &self,
        collection: &str,
        filename: &str,
        bytes: &[u8],
    ) -> StorageResult<String> {
        validate_key(collection)?;
        validate_key(filename)?;

        let dir = self.root.join(collection);
        tokio::fs::create_dir_all(&dir).await?;

        let mut stored = filename.to_string();
        while tokio::fs::try_exists(dir.join(&stored)).await? {
            stored = dedup_name(filename);
        }

        let path = dir.join(&stored);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::write_failed(format!("{}: {}", path.display(), e)))?;

        debug!(
            collection,
            filename = %stored,
            bytes = bytes.len(),
            "stored media file"
        );
        Ok(stored)
    }

    /// Read a stored file.
    pub async fn read_bytes(&self, collection: &str, filename: &str) -> StorageResult<Vec<u8>> {
        validate_key(collection)?;
        validate_key(filename)?;

        let path = self.root.join(collection).join(filename);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(format!("{}/{}", collection, filename)))
            }
            Err(e) => Err(StorageError::ReadFailed(format!("{}: {}", path.display(), e))),
        }
    }

    /// Check whether a stored file exists.
    pub async fn exists(&self, collection: &str, filename: &str) -> StorageResult<bool> {
        validate_key(collection)?;
        validate_key(filename)?;
        Ok(tokio::fs::try_exists(self.root.join(collection).join(filename)).await?)
    }

    /// Delete a stored file. Missing files surface as `NotFound`.
    pub async fn delete(&self, collection: &str, filename: &str) -> StorageResult<()> {
        validate_key(collection)?;
        validate_key(filename)?;

        let path = self.root.join(collection).join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(collection, filename, "deleted media file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(format!("{}/{}", collection, filename)))
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Public URL path for a stored file.
    pub fn public_path(&self, collection: &str, filename: &str) -> String {
        format!("/media/{}/{}", collection, filename)
    }
}

/// Reject keys that are empty or could traverse outside their collection.
fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_key("empty key"));
    }
    if key.contains('/') || key.contains('\\') || key == "." || key == ".." {
        return Err(StorageError::invalid_key(key));
    }
    Ok(())
}

/// Insert a short unique suffix before the extension.
fn dedup_name(filename: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string()[..8].to_string();
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, suffix, ext),
        _ => format!("{}-{}", filename, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(FileStoreConfig {
            root: dir.path().join("media"),
        })
        .await
        .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn put_and_read_roundtrip() {
        let (_dir, store) = store().await;
        let stored = store
            .put_bytes(CAROUSEL_COLLECTION, "praia.jpg", b"jpeg bytes")
            .await
            .unwrap();
        assert_eq!(stored, "praia.jpg");
        let bytes = store
            .read_bytes(CAROUSEL_COLLECTION, "praia.jpg")
            .await
            .unwrap();
        assert_eq!(bytes, b"jpeg bytes");
    }

    #[tokio::test]
    async fn name_collisions_get_a_suffix() {
        let (_dir, store) = store().await;
        let first = store
            .put_bytes(GALLERY_COLLECTION, "foto.png", b"one")
            .await
            .unwrap();
        let second = store
            .put_bytes(GALLERY_COLLECTION, "foto.png", b"two")
            .await
            .unwrap();
        assert_eq!(first, "foto.png");
        assert_ne!(second, first);
        assert!(second.starts_with("foto-") && second.ends_with(".png"));
        assert_eq!(
            store.read_bytes(GALLERY_COLLECTION, &first).await.unwrap(),
            b"one"
        );
        assert_eq!(
            store.read_bytes(GALLERY_COLLECTION, &second).await.unwrap(),
            b"two"
        );
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, store) = store().await;
        for bad in ["../escape", "a/b", "a\\b", "", ".."] {
            let err = store
                .put_bytes(CAROUSEL_COLLECTION, bad, b"x")
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {:?}", bad);
        }
    }

    #[tokio::test]
    async fn delete_then_read_is_not_found() {
        let (_dir, store) = store().await;
        store
            .put_bytes(LOGO_COLLECTION, "logo.png", b"logo")
            .await
            .unwrap();
        store.delete(LOGO_COLLECTION, "logo.png").await.unwrap();
        let err = store.read_bytes(LOGO_COLLECTION, "logo.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn public_path_is_collection_scoped() {
        let (_dir, store) = store().await;
        assert_eq!(
            store.public_path(CAROUSEL_COLLECTION, "praia.jpg"),
            "/media/carousel/praia.jpg"
        );
    }
}
