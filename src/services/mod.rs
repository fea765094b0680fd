//! Service layer.
//!
//! Request logic separated from transport concerns, shared by the web
//! server and the CLI.

pub mod ocr;

pub use ocr::{OcrRequestError, OcrService};
