//! Configuration and constants for the importer, store and reports.

/// Current analysis report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Number of rows returned by the hotspot queries unless overridden
pub const DEFAULT_TOP_N: usize = 10;

/// Upper bound accepted for `--top`
pub const MAX_TOP_N: usize = 1000;

/// Symbol perf prints when it could not resolve an address
pub const UNKNOWN_SYMBOL: &str = "[unknown]";

/// Token separating class scope from method name in managed-runtime symbols
pub const DEFAULT_SCOPE_SEPARATOR: &str = "::";

/// File name used for the store inside the import output directory
pub const DEFAULT_DB_NAME: &str = "performance_data.sqlite";

/// Capture duration recorded when the caller does not supply one
pub const DEFAULT_RECORD_SECONDS: u64 = 60;

/// Line numbers of unparseable lines kept in the import statistics.
/// The failure counter itself is never capped.
pub const MAX_RECORDED_FAILURES: usize = 100;

// Metadata keys written by the importer
pub const META_PROGRAM_NAME: &str = "program_name";
pub const META_RECORD_SECONDS: &str = "record_seconds";
pub const META_IMPORT_TIME: &str = "import_time";
pub const META_SOURCE_FILE: &str = "perf_script_file";
pub const META_SAMPLE_COUNT: &str = "sample_count";
pub const META_STACK_COUNT: &str = "stack_count";
pub const META_PARSE_FAILURES: &str = "parse_failure_count";
pub const META_ORPHAN_FRAMES: &str = "orphan_frame_count";
