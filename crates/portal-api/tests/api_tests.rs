//! End-to-end router tests over an in-memory database and a temporary
//! media root.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use portal_api::{create_router, ApiConfig, AppState};
use portal_db::Database;
use portal_storage::{FileStore, FileStoreConfig};

const BOUNDARY: &str = "portal-test-boundary";

async fn test_app() -> (tempfile::TempDir, AppState, Router) {
    let dir = tempfile::tempdir().unwrap();

    let db = Database::in_memory().await.unwrap();
    db.init_schema().await.unwrap();
    let files = FileStore::new(FileStoreConfig {
        root: dir.path().join("media"),
    })
    .await
    .unwrap();

    let state = AppState {
        config: ApiConfig::default(),
        db,
        files,
    };
    let router = create_router(state.clone(), None);
    (dir, state, router)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    bytes
}

#[tokio::test]
async fn health_and_ready_respond() {
    let (_dir, _state, app) = test_app().await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["storage"]["status"], "ok");
}

#[tokio::test]
async fn citizen_request_intake_validates_cpf() {
    let (_dir, _state, app) = test_app().await;

    // Valid CPF, punctuated form
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/requests",
            json!({
                "name": "Maria Souza",
                "cpf": "111.444.777-35",
                "description": "Streetlight out on my street"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cpf"], "11144477735");

    // Bad checksum aborts the save
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/requests",
            json!({
                "name": "Maria Souza",
                "cpf": "123.456.789-00",
                "description": "Pothole"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("check digit"));

    // All-equal digits are rejected by convention
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/requests",
            json!({
                "name": "Maria Souza",
                "cpf": "000.000.000-00",
                "description": "Pothole"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing fields are rejected before validation
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/requests",
            json!({ "name": " ", "cpf": "111.444.777-35", "description": "x" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only the accepted request was persisted
    let (status, body) = send(&app, get("/api/admin/requests")).await;
    assert_eq!(status, StatusCode::OK);
    let stored = body.as_array().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["cpf"], "11144477735");
}

#[tokio::test]
async fn post_listing_searches_and_paginates() {
    let (_dir, _state, app) = test_app().await;

    for i in 0..7 {
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/admin/posts",
                json!({
                    "title": format!("Post {i}"),
                    "content": if i == 3 { "special announcement" } else { "body" },
                    "published_at": format!("2026-07-{:02}T12:00:00Z", i + 1)
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/api/posts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 7);
    assert_eq!(body["num_pages"], 2);
    assert_eq!(body["posts"].as_array().unwrap().len(), 5);
    // Newest first
    assert_eq!(body["posts"][0]["title"], "Post 6");

    // Past-the-end page clamps to the last page
    let (_, body) = send(&app, get("/api/posts?page=99")).await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);

    // Junk page lands on page 1
    let (_, body) = send(&app, get("/api/posts?page=abc")).await;
    assert_eq!(body["page"], 1);

    // Search matches content too
    let (_, body) = send(&app, get("/api/posts?q=SPECIAL")).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["posts"][0]["title"], "Post 3");

    // Detail + 404
    let id = body["posts"][0]["id"].as_i64().unwrap();
    let (status, _) = send(&app, get(&format!("/api/posts/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get("/api/posts/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn carousel_upload_normalizes_the_stored_payload() {
    let (dir, _state, app) = test_app().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/carousels", json!({ "name": "Homepage" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let carousel_id = body["id"].as_i64().unwrap();

    // A large transparent PNG goes in; a 250x250 JPEG must come out
    let upload = png_bytes(640, 360, [200, 10, 10, 0]);
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            &format!("/api/admin/carousels/{carousel_id}/images"),
            &[("title", "Beach"), ("position", "1")],
            Some(("praia.png", &upload)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Beach");
    assert_eq!(body["url"], "/media/carousel/praia.png");

    let stored = std::fs::read(dir.path().join("media/carousel/praia.png")).unwrap();
    assert_eq!(
        image::guess_format(&stored).unwrap(),
        image::ImageFormat::Jpeg
    );
    let decoded = image::load_from_memory(&stored).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (250, 250));
    // Transparency flattened to white
    let rgb = decoded.to_rgb8();
    assert!(rgb.get_pixel(125, 125).0.iter().all(|&c| c >= 250));

    // The public listing serves it
    let (status, body) = send(&app, get(&format!("/api/carousels/{carousel_id}/images"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["images"].as_array().unwrap().len(), 1);

    // Undecodable uploads are rejected and nothing is stored
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            &format!("/api/admin/carousels/{carousel_id}/images"),
            &[("title", "Broken")],
            Some(("broken.png", b"not an image")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("image"));
    assert!(!dir.path().join("media/carousel/broken.png").exists());

    // Upload to a missing carousel is a 404
    let (status, _) = send(
        &app,
        multipart_request(
            "POST",
            "/api/admin/carousels/999/images",
            &[("title", "Nowhere")],
            Some(("x.png", &png_bytes(10, 10, [0, 0, 0, 255]))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logo_replacement_lands_on_a_single_slot() {
    let (_dir, _state, app) = test_app().await;

    // No logo yet
    let (_, body) = send(&app, get("/api/site")).await;
    assert!(body["logo"].is_null());

    let v1 = png_bytes(32, 32, [0, 0, 0, 255]);
    let (status, _) = send(
        &app,
        multipart_request("PUT", "/api/admin/logo", &[], Some(("logo.png", &v1))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let v2 = png_bytes(64, 64, [255, 255, 255, 255]);
    let (status, body) = send(
        &app,
        multipart_request(
            "PUT",
            "/api/admin/logo",
            &[("title", "City Hall")],
            Some(("logo-v2.png", &v2)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "City Hall");

    let (_, body) = send(&app, get("/api/site")).await;
    assert_eq!(body["logo"]["url"], "/media/logo/logo-v2.png");
    assert_eq!(body["logo"]["title"], "City Hall");
}

#[tokio::test]
async fn site_context_lists_only_active_pages() {
    let (_dir, _state, app) = test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/pages",
            json!({ "title": "About", "content": "<p>hi</p>" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let about_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/pages",
            json!({ "title": "Archive", "content": "", "active": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let archive_id = body["id"].as_i64().unwrap();

    let (_, body) = send(&app, get("/api/site")).await;
    assert_eq!(body["site_name"], "Meu Site");
    let menu = body["menu_pages"].as_array().unwrap();
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0]["title"], "About");

    // Inactive pages remain directly addressable
    let (status, _) = send(&app, get(&format!("/api/pages/{archive_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get(&format!("/api/pages/{about_id}"))).await;
    assert_eq!(status, StatusCode::OK);
}
