//! Relational persistence for imported traces.
//!
//! This module handles:
//! - Creating the SQLite schema and its indexes
//! - Writing samples, frames and metadata inside one transaction per import
//! - Read helpers and schema validation for the query layer

pub mod schema;
pub mod sqlite;

// Re-export main types
pub use schema::{StoredFrame, StoredSample, REQUIRED_TABLES};
pub use sqlite::{ImportTransaction, Store};
