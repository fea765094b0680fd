//! Fetched image wrapper.

use reqwest::StatusCode;

/// Body and metadata of a successful image fetch.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// URL that was requested.
    pub url: String,
    pub status: StatusCode,
    /// Declared Content-Type header, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    /// Content type for messages, `unknown` when the header was absent.
    pub fn content_type_or_unknown(&self) -> &str {
        self.content_type.as_deref().unwrap_or("unknown")
    }

    /// Whether the declared content type mentions "image".
    pub fn is_declared_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("image"))
    }
}
