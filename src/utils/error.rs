//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single trace line could not be turned into a record.
///
/// These never abort an import; the assembler counts them and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line does not match the sample header shape `comm pid/tid timestamp:`")]
    MalformedSample,

    #[error("indented line does not match the stack frame shape `ip symbol (dso)`")]
    MalformedFrame,

    #[error("invalid {field} value: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Errors raised by the SQLite store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot open store {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Store not found: {0}")]
    NotFound(PathBuf),

    #[error("Store is missing required table `{table}`")]
    SchemaMissing { table: &'static str },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors that abort a trace import
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Trace file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Failed to read trace file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
