//! Validation report outputs: JSON payload and highlighted dataset copy.

pub mod highlight;
pub mod json;

pub use highlight::{HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN, HighlightPaths, write_highlighted_copy};
pub use json::write_report_json;
