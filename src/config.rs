//! Configuration management for the OCR server.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then environment variables and CLI flags (resolved by clap before they
//! reach [`load_settings`]).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::OcrConfig;

/// Default listen port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Name of the append-only audit log inside the data directory.
pub const LOG_FILENAME: &str = "ocr_logs.txt";

/// Timeout for the outbound image fetch, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;

/// Number of characters of extracted text kept in each log line.
pub const DEFAULT_LOG_EXCERPT_CHARS: usize = 100;

/// Default data directory, relative to the working directory.
const DEFAULT_DATA_DIR: &str = "data";

/// Debug image subdirectory name.
const IMAGES_SUBDIR: &str = "images";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory holding the log file.
    pub data_dir: PathBuf,
    /// Directory for debug copies of decoded images.
    pub images_dir: PathBuf,
    /// User agent for the image fetch (None = browser user agent).
    pub user_agent: Option<String>,
    /// Image fetch timeout in seconds.
    pub request_timeout: u64,
    /// Characters of OCR text written to each log line.
    pub log_excerpt_chars: usize,
    /// OCR backend configuration.
    pub ocr: OcrConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_data_dir(PathBuf::from(DEFAULT_DATA_DIR))
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            images_dir: data_dir.join(IMAGES_SUBDIR),
            data_dir,
            user_agent: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_excerpt_chars: DEFAULT_LOG_EXCERPT_CHARS,
            ocr: OcrConfig::default(),
        }
    }

    /// Move the data directory, keeping the images directory beneath it.
    pub fn set_data_dir(&mut self, data_dir: PathBuf) {
        self.images_dir = data_dir.join(IMAGES_SUBDIR);
        self.data_dir = data_dir;
    }

    /// Full path of the audit log file.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILENAME)
    }

    /// Image fetch timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        // Log diagnostics for debugging permission issues in containers (Unix only)
        #[cfg(unix)]
        {
            Self::log_directory_diagnostics(&self.data_dir, "data_dir");
            Self::log_directory_diagnostics(&self.images_dir, "images_dir");
        }

        for (dir, label) in [(&self.data_dir, "data"), (&self.images_dir, "images")] {
            fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create {} directory '{}': {}",
                        label,
                        dir.display(),
                        e
                    ),
                )
            })?;
        }
        Ok(())
    }

    /// Log diagnostic information about a directory for debugging (Unix only).
    #[cfg(unix)]
    fn log_directory_diagnostics(path: &Path, label: &str) {
        use std::os::unix::fs::MetadataExt;
        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };
        tracing::debug!(
            "{} check: path={}, running as uid={} gid={}",
            label,
            path.display(),
            uid,
            gid
        );

        match fs::metadata(path) {
            Ok(meta) => tracing::debug!(
                "{} exists: owner={}:{}, mode={:o}, is_dir={}",
                label,
                meta.uid(),
                meta.gid(),
                meta.mode() & 0o7777,
                meta.is_dir()
            ),
            Err(_) => tracing::debug!("{} does not exist, will attempt to create", label),
        }
    }
}

/// OCR section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrFileConfig {
    /// Tesseract language (e.g. "eng", "deu+eng").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Tesseract executable name or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Contents of the optional TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Data directory (relative paths resolve against the config file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// User agent: "impersonate", a custom string, or unset for a browser UA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Image fetch timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Characters of OCR text kept per log line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_excerpt_chars: Option<usize>,
    #[serde(default)]
    pub ocr: OcrFileConfig,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve a path relative to a base directory.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let path = PathBuf::from(path_str);
        if path.is_absolute() {
            path
        } else {
            base_dir.join(path)
        }
    }

    /// Apply the file's values on top of existing settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.set_data_dir(self.resolve_path(data_dir, base_dir));
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(chars) = self.log_excerpt_chars {
            settings.log_excerpt_chars = chars;
        }
        if let Some(ref language) = self.ocr.language {
            settings.ocr.language = language.clone();
        }
        if let Some(ref command) = self.ocr.command {
            settings.ocr.command = command.clone();
        }
    }
}

/// Options controlling how settings are loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path.
    pub config_path: Option<PathBuf>,
    /// Data directory override (CLI flag or environment).
    pub data_dir: Option<PathBuf>,
}

/// Load settings: defaults, then config file, then overrides.
pub fn load_settings(options: &LoadOptions) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    if let Some(ref path) = options.config_path {
        let config = FileConfig::load_from_path(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.apply_to_settings(&mut settings, &base_dir);
        tracing::debug!("Loaded config from {}", path.display());
    }

    if let Some(ref data_dir) = options.data_dir {
        settings.set_data_dir(data_dir.clone());
    }

    Ok(settings)
}
