//! Environment check command.

use console::style;

use crate::config::Settings;
use crate::ocr::{OcrBackend, TesseractBackend};

/// Report the resolved settings and whether the OCR backend can run.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", style("Snuggig OCR").bold());
    println!("  Data directory:   {}", settings.data_dir.display());
    println!("  Log file:         {}", settings.log_path().display());
    println!("  Images directory: {}", settings.images_dir.display());
    println!("  Request timeout:  {}s", settings.request_timeout);
    println!("  OCR language:     {}", settings.ocr.language);
    println!();

    let backend = TesseractBackend::with_config(settings.ocr.clone());
    if backend.is_available() {
        println!(
            "{} {} backend available ({})",
            style("✓").green(),
            backend.name(),
            settings.ocr.command
        );
        Ok(())
    } else {
        println!("{} {}", style("✗").red(), backend.availability_hint());
        anyhow::bail!("OCR backend '{}' is not available", backend.name())
    }
}
