//! Text summary of an analysis report.
//!
//! Renders box-drawn tables for the terminal. Long symbols keep their tail
//! (the method name) and are cut on character boundaries.

use crate::analysis::{AnalysisReport, MetadataSummary, SymbolHotspot};

const SYMBOL_WIDTH: usize = 48;
const DSO_WIDTH: usize = 28;
const COMM_WIDTH: usize = 24;
const COUNT_WIDTH: usize = 10;
const PERCENT_WIDTH: usize = 7;

struct Column {
    header: &'static str,
    width: usize,
    right: bool,
}

impl Column {
    fn left(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            right: false,
        }
    }

    fn right(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            right: true,
        }
    }
}

/// Render the full text summary
///
/// **Public** - printed by the analyze command
pub fn render_summary(report: &AnalysisReport) -> String {
    let mut lines = Vec::new();

    lines.push(String::new());
    lines.push("  📋 IMPORT METADATA".to_string());
    lines.extend(render_metadata(&report.metadata));
    lines.push(format!("     {:<18} {}", "Total samples:", report.total_samples));
    lines.push(format!("     {:<18} {}", "Total frames:", report.total_frames));

    lines.push(String::new());
    lines.push("  🧵 PROCESS SHARE".to_string());
    let rows: Vec<Vec<String>> = report
        .process_share
        .iter()
        .map(|share| {
            vec![
                truncate(&share.comm, COMM_WIDTH),
                share.count.to_string(),
                format!("{:.2}%", share.percentage),
            ]
        })
        .collect();
    lines.extend(render_table(
        &[
            Column::left("Process", COMM_WIDTH),
            Column::right("Samples", COUNT_WIDTH),
            Column::right("%", PERCENT_WIDTH),
        ],
        &rows,
    ));

    lines.push(String::new());
    lines.push(format!("  🔥 TOP {} HOTSPOTS", report.hotspots.len()));
    lines.extend(render_hotspots(&report.hotspots, "Symbol"));

    lines.push(String::new());
    lines.push(format!(
        "  ☕ MANAGED HOTSPOTS ({})",
        report.managed_convention
    ));
    lines.extend(render_hotspots(&report.managed_hotspots, "Method"));

    lines.join("\n")
}

fn render_metadata(metadata: &MetadataSummary) -> Vec<String> {
    let fields = [
        ("Program:", &metadata.program_name),
        ("Record seconds:", &metadata.record_seconds),
        ("Imported at:", &metadata.import_time),
        ("Source file:", &metadata.source_file),
        ("Parse failures:", &metadata.parse_failure_count),
        ("Orphan frames:", &metadata.orphan_frame_count),
    ];

    fields
        .iter()
        .map(|(label, value)| format!("     {:<18} {}", label, value.as_deref().unwrap_or("N/A")))
        .collect()
}

fn render_hotspots(hotspots: &[SymbolHotspot], symbol_header: &'static str) -> Vec<String> {
    let rows: Vec<Vec<String>> = hotspots
        .iter()
        .map(|hotspot| {
            vec![
                truncate(&hotspot.display_name, SYMBOL_WIDTH),
                truncate(&hotspot.dso, DSO_WIDTH),
                hotspot.count.to_string(),
                format!("{:.2}%", hotspot.percentage),
            ]
        })
        .collect();

    render_table(
        &[
            Column::left(symbol_header, SYMBOL_WIDTH),
            Column::left("DSO", DSO_WIDTH),
            Column::right("Count", COUNT_WIDTH),
            Column::right("%", PERCENT_WIDTH),
        ],
        &rows,
    )
}

fn render_table(columns: &[Column], rows: &[Vec<String>]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["     (no data)".to_string()];
    }

    let border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = columns.iter().map(|c| "━".repeat(c.width + 2)).collect();
        format!("  {}{}{}", left, segments.join(mid), right)
    };

    let mut lines = vec![border("┏", "┳", "┓")];

    let header: Vec<String> = columns
        .iter()
        .map(|c| format!(" {:^width$} ", c.header, width = c.width))
        .collect();
    lines.push(format!("  ┃{}┃", header.join("┃")));
    lines.push(border("┣", "╋", "┫"));

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .zip(row)
            .map(|(c, value)| {
                if c.right {
                    format!(" {:>width$} ", value, width = c.width)
                } else {
                    format!(" {:<width$} ", value, width = c.width)
                }
            })
            .collect();
        lines.push(format!("  ┃{}┃", cells.join("┃")));
    }

    lines.push(border("┗", "┻", "┛"));
    lines
}

/// Shorten `text` to at most `width` characters, keeping the end
pub fn truncate(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let tail: String = text.chars().skip(len - keep).collect();
    format!("...{}", tail)
}
