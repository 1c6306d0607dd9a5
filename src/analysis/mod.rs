//! Hotspot queries over an imported store.
//!
//! This module handles:
//! - Ranking `(symbol, dso)` groups by frame count
//! - Restricting the ranking to managed-runtime symbols via a pluggable convention
//! - Process share and import metadata summaries

pub mod convention;
pub mod hotspots;
pub mod schema;

// Re-export main types
pub use convention::{
    build_convention, jvm_display_name, ConventionKind, JvmPerfMap, ScopeSeparator,
    SymbolConvention,
};
pub use hotspots::{build_report, percentage_of, rank_by_count, HotspotQuery};
pub use schema::{AnalysisReport, MetadataSummary, ProcessShare, SymbolHotspot};
