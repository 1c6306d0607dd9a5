//! Trace line parsing and record definitions.
//!
//! This module handles:
//! - Classifying raw `perf script` lines
//! - Extracting sample headers and stack frames
//! - Splitting frame symbols from their DSO

pub mod perf_script;
pub mod schema;

// Re-export main types
pub use perf_script::{parse_frame_line, parse_line, parse_sample_line, split_symbol_dso};
pub use schema::{FrameRecord, ParsedLine, SampleRecord};
