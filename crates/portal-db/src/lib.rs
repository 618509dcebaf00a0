//! Typed repositories over the portal's relational database.
//!
//! This crate provides:
//! - A shared [`Database`] handle (SQLite) with idempotent schema setup
//! - One repository per aggregate: posts, pages, taxonomy, carousels,
//!   gallery images, the logo slot, and citizen requests
//! - Listing semantics carried over from the original site: clamped
//!   pagination, substring search, display ordering

pub mod carousel_repo;
pub mod client;
pub mod error;
pub mod gallery_repo;
pub mod logo_repo;
pub mod page_repo;
pub mod post_repo;
pub mod request_repo;
pub mod taxonomy_repo;

pub use carousel_repo::CarouselRepository;
pub use client::Database;
pub use error::{DbError, DbResult};
pub use gallery_repo::GalleryRepository;
pub use logo_repo::LogoRepository;
pub use page_repo::PageRepository;
pub use post_repo::{PostPage, PostRepository, POSTS_PER_PAGE};
pub use request_repo::RequestRepository;
pub use taxonomy_repo::TaxonomyRepository;
