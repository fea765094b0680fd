//! Snuggig OCR - fetch an image by URL and return its text.
//!
//! A small HTTP service that downloads an image, normalizes it to RGB,
//! runs it through an OCR backend (Tesseract by default) and answers with
//! the recognized text as JSON. Every successful request leaves an audit
//! line in `ocr_logs.txt` and a JPEG debug copy of the decoded image.

pub mod cli;
pub mod config;
pub mod decode;
pub mod fetch;
pub mod ocr;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
