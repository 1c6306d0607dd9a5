//! Import command implementation.
//!
//! The import command:
//! 1. Checks the trace file exists
//! 2. Opens (or creates) the store
//! 3. Streams the trace through the parser and assembler into one transaction
//! 4. Records import metadata
//! 5. Commits and reports statistics

use crate::aggregator::{AssemblyStats, TraceAssembler};
use crate::store::{ImportTransaction, Store};
use crate::utils::config::{
    DEFAULT_DB_NAME, DEFAULT_RECORD_SECONDS, META_IMPORT_TIME, META_ORPHAN_FRAMES,
    META_PARSE_FAILURES, META_PROGRAM_NAME, META_RECORD_SECONDS, META_SAMPLE_COUNT,
    META_SOURCE_FILE, META_STACK_COUNT,
};
use crate::utils::error::{ImportError, StoreError};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

/// Lines between progress messages
const PROGRESS_INTERVAL: usize = 1_000_000;

/// Arguments for the import command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ImportArgs {
    /// `perf script` text output to read
    pub trace_path: PathBuf,

    /// Store file to create or replace
    pub db_path: PathBuf,

    /// Name of the profiled program, kept as metadata
    pub program_name: String,

    /// Capture duration in seconds, kept as metadata
    pub record_seconds: u64,
}

impl Default for ImportArgs {
    fn default() -> Self {
        Self {
            trace_path: PathBuf::from("perf_output.txt"),
            db_path: PathBuf::from(DEFAULT_DB_NAME),
            program_name: String::new(),
            record_seconds: DEFAULT_RECORD_SECONDS,
        }
    }
}

/// Counters reported after an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub sample_count: u64,

    pub stack_frame_count: u64,

    pub parse_failure_count: u64,

    pub orphan_frame_count: u64,

    /// First line numbers that could not be parsed
    pub failed_lines: Vec<usize>,
}

impl From<AssemblyStats> for ImportStats {
    fn from(stats: AssemblyStats) -> Self {
        Self {
            sample_count: stats.sample_count,
            stack_frame_count: stats.stack_count,
            parse_failure_count: stats.parse_failure_count,
            orphan_frame_count: stats.orphan_frame_count,
            failed_lines: stats.failed_lines,
        }
    }
}

/// Import one trace file into a store
///
/// **Public** - library entry point, also used by `execute_import`
///
/// Previously imported samples and frames in the store are replaced and the
/// metadata keys are overwritten. Nothing changes on disk unless the whole
/// trace was read.
///
/// # Arguments
/// * `args` - Trace and store locations plus metadata values
///
/// # Returns
/// Counters for the trace that was read
///
/// # Errors
/// * `ImportError::SourceNotFound` - trace file missing (store untouched)
/// * `ImportError::Read` - I/O failure while reading the trace
/// * `ImportError::Store` - store cannot be created or written
pub fn import_trace(args: &ImportArgs) -> Result<ImportStats, ImportError> {
    if !args.trace_path.is_file() {
        return Err(ImportError::SourceNotFound(args.trace_path.clone()));
    }

    let read_err = |source| ImportError::Read {
        path: args.trace_path.clone(),
        source,
    };
    let file = File::open(&args.trace_path).map_err(read_err)?;

    let mut store = Store::create(&args.db_path)?;
    let tx = store.begin_import()?;
    let mut assembler = TraceAssembler::new(tx);

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut line_number = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(read_err)? == 0 {
            break;
        }
        line_number += 1;

        let line = String::from_utf8_lossy(&buf);
        assembler.feed_line(line_number, line.trim_end_matches(&['\n', '\r'][..]))?;

        if line_number % PROGRESS_INTERVAL == 0 {
            let stats = assembler.stats();
            info!(
                "  ... {} lines, {} samples, {} frames",
                line_number, stats.sample_count, stats.stack_count
            );
        }
    }

    let (mut tx, stats) = assembler.finish();
    debug!("Read {} lines from {}", line_number, args.trace_path.display());

    write_metadata(&mut tx, args, &stats)?;
    tx.commit()?;

    Ok(stats.into())
}

/// Upsert the metadata keys for this run
///
/// **Private** - internal helper for import_trace
fn write_metadata(
    tx: &mut ImportTransaction<'_>,
    args: &ImportArgs,
    stats: &AssemblyStats,
) -> Result<(), StoreError> {
    let source = args.trace_path.display().to_string();
    let pairs = [
        (META_PROGRAM_NAME, args.program_name.clone()),
        (META_RECORD_SECONDS, args.record_seconds.to_string()),
        (META_IMPORT_TIME, chrono::Utc::now().to_rfc3339()),
        (META_SOURCE_FILE, source),
        (META_SAMPLE_COUNT, stats.sample_count.to_string()),
        (META_STACK_COUNT, stats.stack_count.to_string()),
        (META_PARSE_FAILURES, stats.parse_failure_count.to_string()),
        (META_ORPHAN_FRAMES, stats.orphan_frame_count.to_string()),
    ];

    for (key, value) in &pairs {
        tx.upsert_metadata(key, value)?;
    }
    Ok(())
}

/// Execute the import command
///
/// **Public** - main entry point called from main.rs
///
/// Creates the store's parent directory when missing, then runs
/// `import_trace` and prints a summary.
pub fn execute_import(args: ImportArgs) -> Result<ImportStats> {
    let start_time = Instant::now();

    info!("Importing trace: {}", args.trace_path.display());
    info!("Store: {}", args.db_path.display());

    if let Some(parent) = args.db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating output directory: {}", parent.display());
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory {}", parent.display())
            })?;
        }
    }

    let stats = import_trace(&args)
        .with_context(|| format!("Failed to import {}", args.trace_path.display()))?;

    if stats.parse_failure_count > 0 {
        warn!(
            "{} lines could not be parsed (first at line {})",
            stats.parse_failure_count,
            stats.failed_lines.first().copied().unwrap_or_default()
        );
    }

    println!("\n{}", "=".repeat(60));
    println!("IMPORT SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Program:         {}", args.program_name);
    println!("Samples:         {}", stats.sample_count);
    println!("Stack frames:    {}", stats.stack_frame_count);
    println!("Parse failures:  {}", stats.parse_failure_count);
    println!("Orphan frames:   {}", stats.orphan_frame_count);
    println!("Store:           {}", args.db_path.display());
    println!("{}", "=".repeat(60));

    let elapsed = start_time.elapsed();
    info!("Import completed in {:.2}s", elapsed.as_secs_f64());

    Ok(stats)
}

/// Validate import arguments
///
/// **Public** - can be called before execute_import for early validation
pub fn validate_args(args: &ImportArgs) -> Result<()> {
    if args.trace_path.as_os_str().is_empty() {
        anyhow::bail!("Trace path cannot be empty");
    }

    if args.db_path.as_os_str().is_empty() {
        anyhow::bail!("Store path cannot be empty");
    }

    if args.db_path.is_dir() {
        anyhow::bail!("Store path is a directory: {}", args.db_path.display());
    }

    if args.program_name.trim().is_empty() {
        anyhow::bail!("Program name cannot be empty");
    }

    Ok(())
}
