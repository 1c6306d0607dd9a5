//! perfdb CLI
//!
//! Imports `perf script` output into SQLite and reports CPU hotspots.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use perfdb::analysis::ConventionKind;
use perfdb::commands::analyze::{self, AnalyzeArgs};
use perfdb::commands::import::{self, ImportArgs};
use perfdb::commands::{display_schema, display_version, execute_analyze, execute_import};
use perfdb::utils::config::{DEFAULT_DB_NAME, DEFAULT_RECORD_SECONDS, DEFAULT_SCOPE_SEPARATOR};

/// perfdb - perf script traces in SQLite
#[derive(Parser, Debug)]
#[command(name = "perfdb")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a perf script trace into a SQLite store
    Import {
        /// Text output of `perf script`
        trace: PathBuf,

        /// Directory for the store (created if missing)
        output_dir: PathBuf,

        /// Name of the profiled program
        #[arg(long)]
        program_name: String,

        /// Capture duration in seconds
        #[arg(long, default_value_t = DEFAULT_RECORD_SECONDS)]
        record_seconds: u64,

        /// Store file name inside the output directory
        #[arg(long, default_value = DEFAULT_DB_NAME)]
        db_name: String,
    },

    /// Report hotspots from an imported store
    Analyze {
        /// Store produced by `perfdb import`
        db: PathBuf,

        /// Number of rows in each ranked list
        #[arg(long, env = "PERFDB_TOP_N", default_value = "10")]
        top: usize,

        /// Convention used to detect managed-runtime symbols
        #[arg(long, value_enum, default_value_t = ConventionKind::Scope)]
        convention: ConventionKind,

        /// Scope token for the `scope` convention
        #[arg(long, default_value = DEFAULT_SCOPE_SEPARATOR)]
        separator: String,

        /// Output path for the JSON report (optional)
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Import {
            trace,
            output_dir,
            program_name,
            record_seconds,
            db_name,
        } => {
            let args = ImportArgs {
                trace_path: trace,
                db_path: output_dir.join(db_name),
                program_name,
                record_seconds,
            };

            import::validate_args(&args)?;
            execute_import(args)?;
        }

        Commands::Analyze {
            db,
            top,
            convention,
            separator,
            json,
        } => {
            let args = AnalyzeArgs {
                db_path: db,
                top_n: top,
                convention,
                separator,
                output_json: json,
                print_summary: true,
            };

            analyze::validate_args(&args)?;
            execute_analyze(args)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
