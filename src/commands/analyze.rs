//! Analyze command implementation.
//!
//! Opens a store read-only, builds the hotspot report, prints the text
//! summary and optionally writes the report as JSON.

use crate::analysis::{build_convention, build_report, AnalysisReport, ConventionKind};
use crate::output::{render_summary, write_report};
use crate::store::Store;
use crate::utils::config::{DEFAULT_DB_NAME, DEFAULT_SCOPE_SEPARATOR, DEFAULT_TOP_N, MAX_TOP_N};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Store produced by the import command
    pub db_path: PathBuf,

    /// Rows per ranked list
    pub top_n: usize,

    /// Which managed-runtime convention to apply
    pub convention: ConventionKind,

    /// Token used by `ConventionKind::Scope`
    pub separator: String,

    /// Output path for the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_NAME),
            top_n: DEFAULT_TOP_N,
            convention: ConventionKind::default(),
            separator: DEFAULT_SCOPE_SEPARATOR.to_string(),
            output_json: None,
            print_summary: true,
        }
    }
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Store missing or lacking a required table
/// * Query failures
/// * JSON write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisReport> {
    info!("Analyzing store: {}", args.db_path.display());

    let store = Store::open_read_only(&args.db_path)
        .with_context(|| format!("Failed to open store {}", args.db_path.display()))?;

    let convention = build_convention(args.convention, &args.separator);
    debug!("Managed symbol convention: {}", convention.name());

    let report = build_report(&store, args.top_n, convention.as_ref())
        .context("Failed to query hotspots")?;

    info!(
        "{} samples, {} frames, {} hotspots",
        report.total_samples,
        report.total_frames,
        report.hotspots.len()
    );

    if let Some(path) = &args.output_json {
        write_report(&report, path).context("Failed to write JSON report")?;
        info!("✓ Report written to: {}", path.display());
    }

    if args.print_summary {
        println!("{}", render_summary(&report));
    }

    Ok(report)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.db_path.as_os_str().is_empty() {
        anyhow::bail!("Store path cannot be empty");
    }

    if args.top_n == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top_n > MAX_TOP_N {
        anyhow::bail!("top is too large (max {})", MAX_TOP_N);
    }

    if args.convention == ConventionKind::Scope && args.separator.is_empty() {
        anyhow::bail!("Scope separator cannot be empty");
    }

    Ok(())
}
