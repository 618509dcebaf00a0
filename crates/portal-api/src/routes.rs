//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::handlers::admin::{
    create_carousel, create_category, create_page, create_post, create_tag, delete_carousel,
    delete_carousel_image, delete_category, delete_gallery_image, delete_page, delete_post,
    delete_tag, list_all_carousels, list_categories, list_gallery_images, list_pages,
    list_requests, list_tags, set_logo, update_carousel, update_category, update_page,
    update_post, upload_carousel_image, upload_gallery_image,
};
use crate::handlers::carousels::{carousel_images, list_carousels};
use crate::handlers::health::{health, ready};
use crate::handlers::pages::get_page;
use crate::handlers::posts::{get_post, list_posts};
use crate::handlers::requests::submit_request;
use crate::handlers::site::site_context;
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Public content routes
    let public_routes = Router::new()
        .route("/site", get(site_context))
        .route("/posts", get(list_posts))
        .route("/posts/:post_id", get(get_post))
        .route("/pages/:page_id", get(get_page))
        .route("/carousels", get(list_carousels))
        .route("/carousels/:carousel_id/images", get(carousel_images))
        .route("/requests", post(submit_request));

    // Content management (gated upstream; no auth layer here by design
    // of the original system)
    let admin_routes = Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:post_id", put(update_post))
        .route("/posts/:post_id", delete(delete_post))
        .route("/categories", get(list_categories))
        .route("/categories", post(create_category))
        .route("/categories/:category_id", put(update_category))
        .route("/categories/:category_id", delete(delete_category))
        .route("/tags", get(list_tags))
        .route("/tags", post(create_tag))
        .route("/tags/:tag_id", delete(delete_tag))
        .route("/pages", get(list_pages))
        .route("/pages", post(create_page))
        .route("/pages/:page_id", put(update_page))
        .route("/pages/:page_id", delete(delete_page))
        .route("/carousels", get(list_all_carousels))
        .route("/carousels", post(create_carousel))
        .route("/carousels/:carousel_id", put(update_carousel))
        .route("/carousels/:carousel_id", delete(delete_carousel))
        .route("/carousels/:carousel_id/images", post(upload_carousel_image))
        .route(
            "/carousels/:carousel_id/images/:image_id",
            delete(delete_carousel_image),
        )
        .route("/gallery", get(list_gallery_images))
        .route("/gallery", post(upload_gallery_image))
        .route("/gallery/:image_id", delete(delete_gallery_image))
        .route("/logo", put(set_logo))
        .route("/requests", get(list_requests));

    let api_routes = public_routes.nest("/admin", admin_routes);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .nest("/api", api_routes)
        .nest_service("/media", ServeDir::new(state.files.root()))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(&state.config))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .with_state(state);

    match metrics_handle {
        Some(handle) => app.route("/metrics", get(move || async move { handle.render() })),
        None => app,
    }
}
