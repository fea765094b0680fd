//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction. The decoded
//! image is written to a scratch PNG first since the CLI only reads files.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, ImageFormat};
use tempfile::TempDir;

use super::backend::{OcrBackend, OcrConfig, OcrError, OcrResult};

/// Check if a binary is available in PATH (or is an existing path).
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.config.command)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!(
                        "tesseract failed: {}",
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.config.command
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.config.command)
    }

    fn availability_hint(&self) -> String {
        if check_binary(&self.config.command) {
            format!("Tesseract is available (language: {})", self.config.language)
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    fn ocr_image(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();

        let temp_dir = TempDir::new()?;
        let image_path = temp_dir.path().join("input.png");
        image
            .save_with_format(&image_path, ImageFormat::Png)
            .map_err(|e| OcrError::ImageError(format!("Failed to write scratch image: {}", e)))?;

        let text = self.run_tesseract(&image_path)?;
        let elapsed = start.elapsed();

        Ok(OcrResult {
            text,
            backend: self.name(),
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn missing_tesseract() -> TesseractBackend {
        TesseractBackend::with_config(OcrConfig {
            command: "snuggig-no-such-tesseract".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let backend = missing_tesseract();
        assert!(!backend.is_available());
        assert!(backend.availability_hint().contains("apt install"));
    }

    #[test]
    fn test_missing_binary_reports_backend_not_available() {
        let backend = missing_tesseract();
        let image = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
        let err = backend.ocr_image(&image).unwrap_err();
        match err {
            OcrError::BackendNotAvailable(msg) => {
                assert!(msg.contains("snuggig-no-such-tesseract"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_default_config() {
        let backend = TesseractBackend::default();
        assert_eq!(backend.name(), "tesseract");
        assert_eq!(backend.config.language, "eng");
    }
}
