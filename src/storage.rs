//! Audit trail: the append-only request log and debug image copies.
//!
//! The service writes through the [`AuditStore`] trait; [`FsAuditStore`] is
//! the on-disk layout used in production:
//!
//! ```text
//! {data_dir}/ocr_logs.txt
//! {data_dir}/images/{%Y%m%d_%H%M%S}.jpg
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tokio::io::AsyncWriteExt;

use crate::config::{Settings, LOG_FILENAME};
use crate::utils::{flatten_line_breaks, truncate_chars};

/// Timestamp format used in log lines.
const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Timestamp format used for debug image names (second granularity).
const IMAGE_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// JPEG quality for debug copies.
const DEBUG_JPEG_QUALITY: u8 = 85;

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub image_url: String,
    /// Leading characters of the extracted text, line breaks flattened.
    pub excerpt: String,
}

impl LogEntry {
    /// Build an entry stamped with the current local time.
    pub fn new(image_url: &str, text: &str, excerpt_chars: usize) -> Self {
        Self::at(Local::now(), image_url, text, excerpt_chars)
    }

    /// Build an entry with an explicit timestamp.
    ///
    /// Line breaks in `text` become spaces so the entry stays on one line.
    pub fn at(
        timestamp: DateTime<Local>,
        image_url: &str,
        text: &str,
        excerpt_chars: usize,
    ) -> Self {
        Self {
            timestamp,
            image_url: image_url.to_string(),
            excerpt: truncate_chars(&flatten_line_breaks(text), excerpt_chars).to_string(),
        }
    }

    /// Render as `timestamp | url | excerpt\n`.
    pub fn to_line(&self) -> String {
        format!(
            "{} | {} | {}\n",
            self.timestamp.format(LOG_TIMESTAMP_FORMAT),
            self.image_url,
            self.excerpt
        )
    }

    /// Identifier for the debug image captured with this entry.
    ///
    /// Second granularity: two requests in the same second share an id and
    /// the later image replaces the earlier one.
    pub fn image_id(&self) -> String {
        image_id_for(&self.timestamp)
    }
}

/// Debug image identifier for a timestamp.
pub fn image_id_for(timestamp: &DateTime<Local>) -> String {
    timestamp.format(IMAGE_ID_FORMAT).to_string()
}

/// Persistence collaborator for the OCR pipeline.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one entry to the log.
    async fn append(&self, entry: &LogEntry) -> std::io::Result<()>;

    /// Store a debug copy of an image under the given id.
    async fn store(&self, image: &DynamicImage, id: &str) -> std::io::Result<()>;

    /// Full log contents, or `None` if nothing has been logged yet.
    async fn read_log(&self) -> std::io::Result<Option<String>>;
}

/// Filesystem-backed audit store.
#[derive(Debug, Clone)]
pub struct FsAuditStore {
    data_dir: PathBuf,
    images_dir: PathBuf,
}

impl FsAuditStore {
    pub fn new(data_dir: PathBuf, images_dir: PathBuf) -> Self {
        Self {
            data_dir,
            images_dir,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.data_dir.clone(), settings.images_dir.clone())
    }

    /// Path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILENAME)
    }

    /// Path a debug image with this id is written to.
    pub fn image_path(&self, id: &str) -> PathBuf {
        self.images_dir.join(format!("{}.jpg", id))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait]
impl AuditStore for FsAuditStore {
    async fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())
            .await?;
        // Single write per line so concurrent appends don't split lines
        file.write_all(entry.to_line().as_bytes()).await?;
        file.flush().await
    }

    async fn store(&self, image: &DynamicImage, id: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.images_dir).await?;

        let image = image.clone();
        let encoded = tokio::task::spawn_blocking(move || encode_jpeg(&image))
            .await
            .map_err(std::io::Error::other)??;

        let path = self.image_path(id);
        tokio::fs::write(&path, encoded).await?;
        tracing::debug!("Saved debug image {}", path.display());
        Ok(())
    }

    async fn read_log(&self) -> std::io::Result<Option<String>> {
        match tokio::fs::read_to_string(self.log_path()).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Encode an image as JPEG bytes.
fn encode_jpeg(image: &DynamicImage) -> std::io::Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, DEBUG_JPEG_QUALITY);
    // JPEG has no alpha channel
    image
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(std::io::Error::other)?;
    Ok(out.into_inner())
}

/// In-memory audit store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    lines: Mutex<Vec<String>>,
    images: Mutex<Vec<(String, u32, u32)>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logged lines, in append order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Stored images as `(id, width, height)`, in store order.
    pub fn images(&self) -> Vec<(String, u32, u32)> {
        self.images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.to_line());
        Ok(())
    }

    async fn store(&self, image: &DynamicImage, id: &str) -> std::io::Result<()> {
        self.images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id.to_string(), image.width(), image.height()));
        Ok(())
    }

    async fn read_log(&self) -> std::io::Result<Option<String>> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        if lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(lines.concat()))
        }
    }
}
