//! Shared utility functions.
//!
//! - `html`: HTML escaping for safe rendering
//! - `text`: character-safe truncation and line flattening

mod html;
mod text;

pub use html::html_escape;
pub use text::{flatten_line_breaks, truncate_chars};
