//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod import;
pub mod utils;

// Re-export main command functions
pub use analyze::{execute_analyze, AnalyzeArgs};
pub use import::{execute_import, import_trace, ImportArgs, ImportStats};
pub use utils::{display_schema, display_version};
