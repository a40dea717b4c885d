//! HTML renderer for snippet editor forms
//!
//! This module turns an [`EditorUnit`](crate::snippet::EditorUnit) tree into
//! an HTML form fragment with prefixed CSS classes.

pub mod config;
pub mod form;

pub use config::FormConfig;
pub use form::render_form;

/// Escape text for use in HTML content and attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
