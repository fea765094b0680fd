//! One-off OCR command.

use console::style;

use crate::config::Settings;
use crate::services::ocr::validate_image_url;
use crate::services::OcrService;

/// Fetch a single image and print its text without writing to the audit store.
pub async fn cmd_extract(settings: &Settings, url: &str) -> anyhow::Result<()> {
    let url = validate_image_url(Some(url))?;
    let service = OcrService::from_settings(settings)?;

    if !service.backend().is_available() {
        println!(
            "{} {}",
            style("✗").red(),
            service.backend().availability_hint()
        );
        anyhow::bail!("OCR backend '{}' is not available", service.backend().name());
    }

    let recognized = service.recognize(url).await?;
    tracing::debug!(
        "Recognized {} chars via {} in {}ms",
        recognized.text.chars().count(),
        recognized.backend,
        recognized.processing_time_ms
    );

    if recognized.text.is_empty() {
        eprintln!("{} No text found", style("!").yellow());
    } else {
        println!("{}", recognized.text);
    }

    Ok(())
}
