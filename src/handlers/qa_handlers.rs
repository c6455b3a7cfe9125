//! HTTP handlers for Q&A management and answer lookup.
//! All collection work is delegated to `AnswerMatcher`.

use crate::{
    errors::AppError,
    models::qa::QaRecord,
    services::answer_matcher::{ERROR_ANSWER, UNKNOWN_ANSWER},
    state::AppState,
};
use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Path, Request, State, rejection::JsonRejection},
    http::header,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Body of `POST /add_qa` (urlencoded or multipart form) and
/// `PUT /update_qa/{id}` (JSON).
/// Missing fields read as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
pub struct QaPayload {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct QaListResponse {
    pub status: &'static str,
    pub qas: Vec<QaRecord>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
        })
    }
}

/// GET `/get_qas`: the whole collection in stored order.
pub async fn get_qas(State(state): State<AppState>) -> Json<QaListResponse> {
    let qas = state.answers.list().await;
    info!("Retrieved {} Q&A pairs", qas.len());
    Json(QaListResponse {
        status: "success",
        qas,
    })
}

/// POST `/add_qa`: form fields `question` and `answer`, sent either
/// urlencoded or as `multipart/form-data`.
pub async fn add_qa(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let payload = read_form(request).await?;

    state.answers.add(&payload.question, &payload.answer).await?;
    Ok(MessageResponse::success(
        "Question and answer added successfully",
    ))
}

async fn read_form(request: Request) -> Result<QaPayload, AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            v.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        });

    if !is_multipart {
        let Form(payload) = Form::<QaPayload>::from_request(request, &())
            .await
            .map_err(|rejection| {
                warn!("Unreadable add_qa form: {}", rejection);
                AppError::bad_request(rejection.body_text())
            })?;
        return Ok(payload);
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| {
            warn!("Unreadable add_qa multipart form: {}", rejection);
            AppError::bad_request(rejection.body_text())
        })?;

    let mut payload = QaPayload::default();
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        warn!("Failed to read add_qa form field: {}", err);
        AppError::new(err.status(), err.body_text())
    })? {
        let slot = match field.name() {
            Some("question") => &mut payload.question,
            Some("answer") => &mut payload.answer,
            _ => continue,
        };
        *slot = field.text().await.map_err(|err| {
            warn!("Failed to read add_qa form field: {}", err);
            AppError::new(err.status(), err.body_text())
        })?;
    }
    Ok(payload)
}

/// PUT `/update_qa/{id}`: JSON body with `question` and `answer`.
pub async fn update_qa(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<QaPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Unreadable update_qa body for {}: {}", id, rejection);
        AppError::bad_request(rejection.body_text())
    })?;

    state
        .answers
        .update(&id, &payload.question, &payload.answer)
        .await?;
    Ok(MessageResponse::success("Q&A updated successfully"))
}

/// DELETE `/delete_qa/{id}`
pub async fn delete_qa(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.answers.delete(&id).await?;
    Ok(MessageResponse::success("Q&A deleted successfully"))
}

/// POST `/get_answer`: always 200; unmatched or unreadable requests get a
/// fixed fallback answer instead of an error.
pub async fn get_answer(
    State(state): State<AppState>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Json<AnswerResponse> {
    let answer = match payload {
        Ok(Json(request)) => state
            .answers
            .find_answer(&request.question)
            .await
            .unwrap_or_else(|| UNKNOWN_ANSWER.to_string()),
        Err(rejection) => {
            warn!("Unreadable get_answer body: {}", rejection);
            ERROR_ANSWER.to_string()
        }
    };
    Json(AnswerResponse { answer })
}
