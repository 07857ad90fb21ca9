use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docintel_core::SessionError;
use docintel_core::session::NO_DOCUMENT_ANSWER;

use super::server::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(serde::Deserialize)]
pub(crate) struct AskRequest {
    pub question: String,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    document_loaded: bool,
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(serde::Serialize)]
struct MessageResponse {
    message: &'static str,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

fn session_error_response(e: &SessionError) -> Response {
    let status = match e {
        SessionError::Document(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Memory(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        document_loaded: state.document_loaded.load(Ordering::Acquire),
    })
}

pub(crate) async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let (file_name, bytes) = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(UPLOAD_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                match field.bytes().await {
                    Ok(bytes) => break (file_name, bytes),
                    Err(e) => return error_response(e.status(), e.body_text()),
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("missing multipart field `{UPLOAD_FIELD}`"),
                );
            }
            Err(e) => return error_response(e.status(), e.body_text()),
        }
    };

    let mut session = state.session.lock().await;
    match session.upload(&file_name, &bytes).await {
        Ok(summary) => {
            state.document_loaded.store(session.is_ready(), Ordering::Release);
            Json(summary).into_response()
        }
        Err(e) => {
            tracing::warn!(file_name = %file_name, "upload failed: {e}");
            session_error_response(&e)
        }
    }
}

pub(crate) async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Response {
    let session = state.session.lock().await;
    match session.ask(&request.question).await {
        Ok(answer) => Json(answer).into_response(),
        Err(e) => {
            tracing::error!("ask failed: {e}");
            session_error_response(&e)
        }
    }
}

pub(crate) async fn extract_handler(State(state): State<AppState>) -> Response {
    match state.session.lock().await.extract() {
        Some(fields) => Json(fields).into_response(),
        None => Json(MessageResponse {
            message: NO_DOCUMENT_ANSWER,
        })
        .into_response(),
    }
}
