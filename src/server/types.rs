//! Request and response bodies for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::OcrRequestError;

/// Body of `POST /ocr`.
#[derive(Debug, Default, Deserialize)]
pub struct OcrRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OcrRequest {
    /// Parse a raw request body.
    ///
    /// An empty body, a non-object, or a non-string `image_url` all parse to
    /// a request without a URL; only malformed JSON is rejected outright.
    pub fn from_body(body: &[u8]) -> Result<Self, OcrRequestError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| OcrRequestError::InvalidBody(e.to_string()))?;

        let image_url = value
            .get("image_url")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        Ok(Self { image_url })
    }
}

/// Successful OCR response.
#[derive(Debug, Serialize, Deserialize)]
pub struct OcrResponse {
    pub text: String,
}

/// JSON error body with its HTTP status.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OcrRequestError> for ErrorResponse {
    fn from(err: OcrRequestError) -> Self {
        let message = err.to_string();
        match err {
            OcrRequestError::MissingImageUrl
            | OcrRequestError::InvalidBody(_)
            | OcrRequestError::ContentType(_)
            | OcrRequestError::UnsupportedFormat(_) => Self::bad_request(message),
            OcrRequestError::Fetch(_)
            | OcrRequestError::Ocr(_)
            | OcrRequestError::Storage { .. }
            | OcrRequestError::Internal(_) => Self::internal_error(message),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::fetch::FetchError;
    use crate::ocr::OcrError;

    #[test]
    fn test_from_body_variants() {
        assert_eq!(
            OcrRequest::from_body(br#"{"image_url": "https://a/b.png"}"#)
                .unwrap()
                .image_url
                .as_deref(),
            Some("https://a/b.png")
        );
        assert!(OcrRequest::from_body(b"{}").unwrap().image_url.is_none());
        assert!(OcrRequest::from_body(b"").unwrap().image_url.is_none());
        assert!(OcrRequest::from_body(b"[1, 2]").unwrap().image_url.is_none());
        assert!(OcrRequest::from_body(br#"{"image_url": 7}"#)
            .unwrap()
            .image_url
            .is_none());
    }

    #[test]
    fn test_from_body_malformed() {
        let err = OcrRequest::from_body(b"{not json").unwrap_err();
        assert!(matches!(err, OcrRequestError::InvalidBody(_)));
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(OcrRequestError, StatusCode)> = vec![
            (OcrRequestError::MissingImageUrl, StatusCode::BAD_REQUEST),
            (
                OcrRequestError::ContentType("text/html".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                OcrRequestError::UnsupportedFormat(DecodeError::Empty),
                StatusCode::BAD_REQUEST,
            ),
            (
                OcrRequestError::Fetch(FetchError::InvalidUrl {
                    url: "x".to_string(),
                    reason: "relative URL without a base".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                OcrRequestError::Fetch(FetchError::Status {
                    status: StatusCode::NOT_FOUND,
                    url: "https://example.com/notfound.png".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                OcrRequestError::Ocr(OcrError::OcrFailed("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                OcrRequestError::Storage {
                    action: "append OCR log",
                    source: std::io::Error::other("disk full"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ErrorResponse::from(err);
            assert_eq!(response.status, expected, "{}", response.error);
        }
    }

    #[test]
    fn test_error_serializes_only_message() {
        let json = serde_json::to_value(ErrorResponse::bad_request("Missing image_url")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Missing image_url"}));
    }
}
