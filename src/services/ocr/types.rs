//! OCR service error and result types.

use image::DynamicImage;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::fetch::FetchError;
use crate::ocr::OcrError;

/// Fixed message for images that cannot be decoded.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Unsupported image format (e.g., SVG or corrupt image).";

/// Failures of a single OCR request, tagged by where they originated.
#[derive(Debug, Error)]
pub enum OcrRequestError {
    #[error("Missing image_url")]
    MissingImageUrl,

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("URL does not point to an image (content type: {0})")]
    ContentType(String),

    #[error("Unsupported image format (e.g., SVG or corrupt image).")]
    UnsupportedFormat(#[source] DecodeError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("Failed to {action}: {source}")]
    Storage {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DecodeError> for OcrRequestError {
    fn from(e: DecodeError) -> Self {
        OcrRequestError::UnsupportedFormat(e)
    }
}

/// Text recognized from a fetched image, before any audit side effects.
#[derive(Debug, Clone)]
pub struct Recognized {
    /// OCR output with surrounding whitespace trimmed.
    pub text: String,
    /// The decoded RGB image.
    pub image: DynamicImage,
    pub backend: &'static str,
    pub processing_time_ms: u64,
}
