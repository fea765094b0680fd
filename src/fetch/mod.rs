//! HTTP client for downloading the images to recognize.

mod response;
mod user_agent;

pub use response::FetchedImage;
pub use user_agent::{UserAgent, BROWSER_USER_AGENTS, IMPERSONATE};

use std::time::{Duration, Instant};

use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::Settings;

/// Errors from the image fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid image URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Timed out after {timeout_secs}s fetching {url}")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{status} for url: {url}")]
    Status { status: StatusCode, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP client used to fetch images. Cheap to clone.
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
    timeout: Duration,
}

impl ImageFetcher {
    /// Create a new fetcher. `user_agent_config` is the raw config value,
    /// see [`UserAgent::from_config`].
    pub fn new(timeout: Duration, user_agent_config: Option<&str>) -> Result<Self, FetchError> {
        let user_agent = UserAgent::from_config(user_agent_config).header_value();
        let client = Client::builder()
            .user_agent(user_agent.as_ref())
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, timeout })
    }

    /// Create a fetcher from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::new(settings.request_timeout(), settings.user_agent.as_deref())
    }

    /// GET the URL and return its body. Any non-2xx status is an error.
    pub async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let parsed = parse_image_url(url)?;

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| match self.request_error(url, e) {
                FetchError::Request { url, source } => FetchError::Body { url, source },
                other => other,
            })?
            .to_vec();

        tracing::debug!(
            "Fetched {} ({} bytes, {}) in {}ms",
            url,
            bytes.len(),
            content_type.as_deref().unwrap_or("no content type"),
            start.elapsed().as_millis()
        );

        Ok(FetchedImage {
            url: url.to_string(),
            status,
            content_type,
            bytes,
        })
    }

    fn request_error(&self, url: &str, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Parse and check the URL scheme before any network activity.
fn parse_image_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
