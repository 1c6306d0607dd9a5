//! Relational layout of an imported trace.
//!
//! Three tables and the indexes the query layer relies on. Samples and
//! frames are replaced wholesale on every import; metadata is upserted.

/// Tables that must exist before the store can be queried
pub const REQUIRED_TABLES: &[&str] = &["perf_samples", "call_stacks", "metadata"];

/// Connection settings applied on every read-write open
pub const PRAGMAS_SQL: &str = r#"
PRAGMA foreign_keys = ON;
PRAGMA cache_size = -64000;
PRAGMA temp_store = MEMORY;
"#;

/// Full schema, safe to run against an existing store
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS perf_samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp REAL NOT NULL,
    pid INTEGER NOT NULL,
    tid INTEGER NOT NULL,
    comm TEXT NOT NULL,
    raw_line TEXT
);

CREATE TABLE IF NOT EXISTS call_stacks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sample_id INTEGER NOT NULL,
    level INTEGER NOT NULL,
    ip TEXT NOT NULL,
    symbol TEXT NOT NULL,
    dso TEXT,
    FOREIGN KEY (sample_id) REFERENCES perf_samples (id)
);

CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT
);

CREATE INDEX IF NOT EXISTS idx_samples_timestamp ON perf_samples(timestamp);
CREATE INDEX IF NOT EXISTS idx_samples_pid ON perf_samples(pid);
CREATE INDEX IF NOT EXISTS idx_stacks_sample_id ON call_stacks(sample_id);
"#;

/// Drop the trace tables (children first) so an import starts clean.
/// Runs inside the import transaction, followed by `SCHEMA_SQL`.
pub const DROP_TRACE_SQL: &str = r#"
DROP TABLE IF EXISTS call_stacks;
DROP TABLE IF EXISTS perf_samples;
"#;

pub const INSERT_SAMPLE_SQL: &str =
    "INSERT INTO perf_samples (timestamp, pid, tid, comm, raw_line) VALUES (?1, ?2, ?3, ?4, ?5)";

pub const INSERT_FRAME_SQL: &str =
    "INSERT INTO call_stacks (sample_id, level, ip, symbol, dso) VALUES (?1, ?2, ?3, ?4, ?5)";

pub const UPSERT_METADATA_SQL: &str = "INSERT INTO metadata (key, value) VALUES (?1, ?2) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// A sample row as stored
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSample {
    pub id: i64,
    pub timestamp: f64,
    pub pid: u32,
    pub tid: u32,
    pub comm: String,
    pub raw_line: String,
}

/// A stack frame row as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFrame {
    pub id: i64,
    pub sample_id: i64,
    pub level: u32,
    pub ip: String,
    pub symbol: String,
    pub dso: String,
}
