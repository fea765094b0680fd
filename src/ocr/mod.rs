//! OCR module.
//!
//! Extracts text from decoded images. Tesseract (via its command line) is
//! the only engine shipped; anything implementing [`OcrBackend`] can be
//! plugged into the service instead.

mod backend;
mod tesseract;

pub use backend::{OcrBackend, OcrConfig, OcrError, OcrResult};
pub use tesseract::{check_binary, TesseractBackend};
