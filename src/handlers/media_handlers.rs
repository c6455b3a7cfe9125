//! HTTP handlers for video and image uploads.
//!
//! Each route is a thin wrapper that fixes the [`MediaKind`]; the shared
//! helpers below do the multipart parsing and response shaping.

use crate::{
    errors::AppError,
    handlers::qa_handlers::MessageResponse,
    models::media::{AssetRef, MediaKind},
    services::media_repository::MediaError,
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: String,
    pub filename: String,
    pub url: String,
    pub display_name: String,
}

pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    upload(&state, MediaKind::Video, multipart).await
}

pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    upload(&state, MediaKind::Image, multipart).await
}

pub async fn get_videos(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    list(&state, MediaKind::Video).await
}

pub async fn get_images(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    list(&state, MediaKind::Image).await
}

pub async fn delete_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    delete(&state, MediaKind::Video, &filename).await
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    delete(&state, MediaKind::Image, &filename).await
}

/// Reads the file part named after the kind (`video`/`image`) and hands it to
/// the repository. Parts without a filename are not files and are skipped.
async fn upload(
    state: &AppState,
    kind: MediaKind,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("No {} file in request: {}", kind, rejection);
        AppError::from(MediaError::MissingFile(kind))
    })?;

    let (filename, data) = read_file_part(&mut multipart, kind)
        .await?
        .ok_or_else(|| {
            warn!("No {} file in request", kind);
            MediaError::MissingFile(kind)
        })?;

    let asset = state.media.upload(kind, &filename, data).await?;
    Ok(Json(UploadResponse {
        status: "success",
        message: format!("{} uploaded successfully", kind.label()),
        filename: asset.filename,
        url: asset.url,
        display_name: asset.display_name,
    }))
}

async fn read_file_part(
    multipart: &mut Multipart,
    kind: MediaKind,
) -> Result<Option<(String, Bytes)>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        debug!("Failed to read multipart field: {}", err);
        AppError::new(err.status(), err.body_text())
    })? {
        if field.name() != Some(kind.as_str()) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(|err| {
            debug!("Failed to read {} bytes: {}", kind, err);
            AppError::new(err.status(), err.body_text())
        })?;
        return Ok(Some((filename, data)));
    }
    Ok(None)
}

async fn list(state: &AppState, kind: MediaKind) -> Result<Json<Value>, AppError> {
    let assets: Vec<AssetRef> = state.media.list(kind).await?;
    let key = format!("{}s", kind.as_str());
    Ok(Json(json!({
        "status": "success",
        key: assets,
    })))
}

async fn delete(
    state: &AppState,
    kind: MediaKind,
    filename: &str,
) -> Result<Json<MessageResponse>, AppError> {
    state.media.delete(kind, filename).await?;
    Ok(MessageResponse::success(format!(
        "{} deleted successfully",
        kind.label()
    )))
}
