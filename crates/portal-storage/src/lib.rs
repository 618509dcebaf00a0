//! Media file store.
//!
//! This crate provides:
//! - Collection-scoped storage of uploaded image payloads under a
//!   configurable media root
//! - Key validation (no traversal, no separators)
//! - Collision-free stored names
//! - Public `/media/...` path mapping

pub mod client;
pub mod error;

pub use client::{
    FileStore, FileStoreConfig, CAROUSEL_COLLECTION, GALLERY_COLLECTION, LOGO_COLLECTION,
};
pub use error::{StorageError, StorageResult};
