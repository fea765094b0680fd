//! Image decoding and normalization.
//!
//! Raster formats supported by the `image` crate decode to a 3-channel RGB
//! image. Vector formats (SVG) and corrupt data are rejected.

use image::DynamicImage;
use thiserror::Error;

/// Errors that can occur while decoding fetched bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Image body is empty")]
    Empty,

    #[error("Failed to decode image: {0}")]
    Unsupported(#[from] image::ImageError),
}

/// Sniff the MIME type from magic bytes, if recognizable.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// Decode bytes and convert to RGB (alpha is dropped, grayscale expanded).
pub fn decode_rgb(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    if let Some(mime) = sniff_mime(bytes) {
        tracing::debug!("Sniffed image content as {}", mime);
    }

    let image = image::load_from_memory(bytes)?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}
