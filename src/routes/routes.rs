//! Defines routes for the Q&A, media and health endpoints.
//!
//! ## Structure
//! - **Q&A endpoints**
//!   - `GET    /get_qas`          — list all pairs
//!   - `POST   /add_qa`           — add a pair (form fields)
//!   - `PUT    /update_qa/{id}`   — replace a pair (JSON body)
//!   - `DELETE /delete_qa/{id}`   — remove a pair
//!   - `POST   /get_answer`       — look up the answer to a spoken question
//!
//! - **Media endpoints** (same shape for images)
//!   - `POST   /upload_video`         — multipart upload, file field `video`
//!   - `GET    /get_videos`           — list uploaded videos
//!   - `DELETE /delete_video/{name}`  — remove a video
//!
//! Uploaded files are served back as static files under the public prefix of
//! their directory, e.g. `/static/uploads/videos/clip.mp4`.

use crate::{
    config::AppConfig,
    handlers::{
        health_handlers::{health, readyz},
        media_handlers::{
            delete_image, delete_video, get_images, get_videos, upload_image, upload_video,
        },
        qa_handlers::{add_qa, delete_qa, get_answer, get_qas, update_qa},
    },
    state::AppState,
};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use std::path::Path;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Build the API router. Upload routes accept bodies up to
/// `max_upload_bytes`; larger requests fail with 413.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // health endpoints
        .route("/health", get(health))
        .route("/readyz", get(readyz))
        // Q&A routes
        .route("/get_qas", get(get_qas))
        .route("/add_qa", post(add_qa))
        .route("/update_qa/{id}", put(update_qa))
        .route("/delete_qa/{id}", delete(delete_qa))
        .route("/get_answer", post(get_answer))
        // Media routes
        .route(
            "/upload_video",
            post(upload_video).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/upload_image",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/get_videos", get(get_videos))
        .route("/get_images", get(get_images))
        .route("/delete_video/{filename}", delete(delete_video))
        .route("/delete_image/{filename}", delete(delete_image))
        .fallback(not_found)
}

/// The full application: API routes, static serving of both upload
/// directories, request tracing and shared state.
pub fn app(state: AppState, cfg: &AppConfig) -> Router {
    let router = routes(cfg.max_upload_bytes);
    let router = serve_dir(router, &cfg.video_url_prefix(), &cfg.video_dir);
    let router = serve_dir(router, &cfg.image_url_prefix(), &cfg.image_dir);
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn serve_dir(router: Router<AppState>, prefix: &str, dir: &Path) -> Router<AppState> {
    if prefix == "/" {
        tracing::warn!(
            "Not serving {} as static files: it would shadow every route",
            dir.display()
        );
        return router;
    }
    router.nest_service(prefix, ServeDir::new(dir))
}

async fn not_found(uri: axum::http::Uri) -> impl IntoResponse {
    tracing::warn!("404 error: {}", uri);
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
