//! Image normalization for uploaded media.
//!
//! This crate provides:
//! - The carousel image pipeline: decode, flatten transparency onto
//!   white, stretch to 250x250, re-encode as JPEG quality 85
//! - Typed, recoverable errors for undecodable uploads

pub mod error;
pub mod normalize;

pub use error::{MediaError, MediaResult};
pub use normalize::{normalize_carousel_image, CAROUSEL_IMAGE_SIZE, JPEG_QUALITY};
