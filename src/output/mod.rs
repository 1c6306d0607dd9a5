//! Output writers for analysis reports.
//!
//! This module handles:
//! - JSON reports (pretty)
//! - Text summaries for the terminal

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{report_to_string, write_report};
pub use text::{render_summary, truncate};
