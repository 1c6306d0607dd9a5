//! Report types produced by the hotspot queries.
//!
//! These are computed on demand and never written back to the store.
//! The whole report serializes to the JSON written by `output::json`.

use crate::utils::config::{
    META_IMPORT_TIME, META_ORPHAN_FRAMES, META_PARSE_FAILURES, META_PROGRAM_NAME,
    META_RECORD_SECONDS, META_SAMPLE_COUNT, META_SOURCE_FILE, META_STACK_COUNT,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// One `(symbol, dso)` group ranked by frame count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolHotspot {
    /// Symbol exactly as stored
    pub symbol: String,

    /// Readable form of the symbol (see `SymbolConvention::display_name`)
    pub display_name: String,

    pub dso: String,

    /// Number of stack frame rows in this group
    pub count: u64,

    /// Share of *all* stack frame rows (0.0 - 100.0)
    pub percentage: f64,
}

/// Sample share of one process name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessShare {
    pub comm: String,

    pub count: u64,

    /// Share of all samples (0.0 - 100.0)
    pub percentage: f64,
}

/// Import metadata as typed optional fields
///
/// Values stay as stored text; a missing key is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataSummary {
    pub program_name: Option<String>,
    pub record_seconds: Option<String>,
    pub import_time: Option<String>,
    pub source_file: Option<String>,
    pub sample_count: Option<String>,
    pub stack_count: Option<String>,
    pub parse_failure_count: Option<String>,
    pub orphan_frame_count: Option<String>,
}

impl MetadataSummary {
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).cloned();
        Self {
            program_name: get(META_PROGRAM_NAME),
            record_seconds: get(META_RECORD_SECONDS),
            import_time: get(META_IMPORT_TIME),
            source_file: get(META_SOURCE_FILE),
            sample_count: get(META_SAMPLE_COUNT),
            stack_count: get(META_STACK_COUNT),
            parse_failure_count: get(META_PARSE_FAILURES),
            orphan_frame_count: get(META_ORPHAN_FRAMES),
        }
    }
}

/// Everything the analyze command reports about one store
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Report schema version for compatibility checking
    pub version: String,

    pub metadata: MetadataSummary,

    pub total_samples: u64,

    pub total_frames: u64,

    /// Ranked by sample count, descending
    pub process_share: Vec<ProcessShare>,

    /// Top symbols over all frames
    pub hotspots: Vec<SymbolHotspot>,

    /// Top symbols accepted by the managed-runtime convention
    pub managed_hotspots: Vec<SymbolHotspot>,

    /// Name of the convention used for `managed_hotspots`
    pub managed_convention: String,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_summary_from_partial_map() {
        let mut map = BTreeMap::new();
        map.insert("program_name".to_string(), "TestFibonacci".to_string());
        map.insert("sample_count".to_string(), "42".to_string());
        map.insert("unrelated".to_string(), "x".to_string());

        let summary = MetadataSummary::from_map(&map);
        assert_eq!(summary.program_name.as_deref(), Some("TestFibonacci"));
        assert_eq!(summary.sample_count.as_deref(), Some("42"));
        assert_eq!(summary.import_time, None);
    }
}
