use crate::store::schema::SCHEMA_SQL;
use crate::utils::config::SCHEMA_VERSION;

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("perfdb Store Schema");
    println!("Report Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Tables:");
        println!("  perf_samples               - One row per sample line");
        println!("    id: integer              - Surrogate key in import order");
        println!("    timestamp: real          - Seconds, as printed by perf");
        println!("    pid, tid: integer        - Process and thread ids");
        println!("    comm: text               - Process name");
        println!("    raw_line: text           - Original sample line");
        println!("  call_stacks                - One row per stack frame line");
        println!("    sample_id: integer       - Owning sample");
        println!("    level: integer           - 0 = innermost frame");
        println!("    ip: text                 - Instruction pointer (hex)");
        println!("    symbol: text             - Function name");
        println!("    dso: text                - Binary image, may be empty");
        println!("  metadata                   - key/value pairs of the last import");
        println!();
        println!("SQL:");
        println!("{}", SCHEMA_SQL.trim());
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("perfdb v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Imports perf script traces into SQLite and reports CPU hotspots.");
}
