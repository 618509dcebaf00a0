//! Axum HTTP API server.
//!
//! This crate provides:
//! - Public content routes: posts, pages, carousels, site context,
//!   citizen-request intake
//! - Admin content-management routes, including normalized carousel
//!   image uploads and the single-slot site logo
//! - Request logging, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
