//! HTTP request handlers for the web server.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};

use super::types::{ErrorResponse, OcrRequest, OcrResponse};
use super::AppState;
use crate::utils::html_escape;

/// Liveness message for `GET /`.
pub const HOME_MESSAGE: &str = "Snuggig OCR Server is running.";

/// Placeholder for `GET /logs` before anything was logged.
pub const NO_LOGS_MESSAGE: &str = "No logs yet.";

/// Liveness check.
/// GET /
pub async fn home() -> &'static str {
    HOME_MESSAGE
}

/// Fetch an image and return its text.
/// POST /ocr
pub async fn ocr(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match OcrRequest::from_body(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Rejected OCR request: {}", e);
            return ErrorResponse::from(e).into_response();
        }
    };

    match state.service.process(request.image_url.as_deref()).await {
        Ok(text) => Json(OcrResponse { text }).into_response(),
        Err(e) => {
            let url = request.image_url.as_deref().unwrap_or("<none>");
            let response = ErrorResponse::from(e);
            if response.status.is_server_error() {
                tracing::error!("OCR request for {} failed: {}", url, response.error);
            } else {
                tracing::warn!("OCR request for {} rejected: {}", url, response.error);
            }
            response.into_response()
        }
    }
}

/// Show the audit log.
/// GET /logs
pub async fn view_logs(State(state): State<AppState>) -> Response {
    match state.service.read_log().await {
        Ok(Some(contents)) => Html(format!("<pre>{}</pre>", html_escape(&contents))).into_response(),
        Ok(None) => NO_LOGS_MESSAGE.into_response(),
        Err(e) => {
            tracing::error!("Failed to read OCR log: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read logs: {}", e),
            )
                .into_response()
        }
    }
}
