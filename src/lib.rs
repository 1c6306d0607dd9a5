//! perfdb
//!
//! Imports `perf script` traces into a SQLite store and reports CPU
//! hotspots over the imported samples and call stacks.
//!
//! This crate provides the core implementation for the `perfdb` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! perf record -g -p <PID> -- sleep 60
//! perf script > perf_output.txt
//! perfdb import perf_output.txt results/ --program-name MyApp
//! perfdb analyze results/performance_data.sqlite --top 20
//! ```
//!
//! ## Library use
//!
//! ```ignore
//! use perfdb::analysis::{build_report, ScopeSeparator};
//! use perfdb::commands::{import_trace, ImportArgs};
//! use perfdb::store::Store;
//!
//! let stats = import_trace(&args)?;
//! let store = Store::open_read_only(&args.db_path)?;
//! let report = build_report(&store, 10, &ScopeSeparator::default())?;
//! ```

pub mod aggregator;
pub mod analysis;
pub mod commands;
pub mod output;
pub mod parser;
pub mod store;
pub mod utils;
