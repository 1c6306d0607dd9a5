//! Line classifier for `perf script` text output.
//!
//! Every line is classified on its own, with no knowledge of the lines
//! around it:
//!
//! ```text
//! java   38693/38695   18515.710550:     250000 cpu-clock:      <- sample
//!     7a21092cb793 LTestFibonacci;::fibonacci (/tmp/perf-38693.map) <- frame
//!     7a2109241234 [unknown] ([unknown])                        <- frame
//! # comment                                                     <- ignored
//! ```
//!
//! Frame lines are recognised by their leading whitespace. Everything else
//! that is not blank or a comment must be a sample header.

use super::schema::{FrameRecord, ParsedLine, SampleRecord};
use crate::utils::error::ParseError;
use regex::Regex;
use std::sync::OnceLock;

/// `<comm> <pid>/<tid> <timestamp>:<rest>` with `comm` matched lazily so it
/// ends at the first pid/tid/timestamp triple.
fn sample_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(.+?)\s+(\d+)/(\d+)\s+([0-9.]+):\s*(.*)$")
            .expect("sample header pattern compiles")
    })
}

/// `<hex-ip> <remainder>`
fn frame_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9a-fA-F]+)\s+(.+)$").expect("stack frame pattern compiles")
    })
}

/// Classify one raw line of trace text
///
/// **Public** - main entry point for line parsing
///
/// # Arguments
/// * `line` - The line with its original leading whitespace. A trailing
///   newline is tolerated.
///
/// # Returns
/// `Sample`, `Frame`, `Ignored` for blanks and comments, or
/// `Unrecognized` with the reason the line was rejected.
pub fn parse_line(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return ParsedLine::Ignored;
    }

    let parsed = if line.starts_with([' ', '\t']) {
        parse_frame_line(trimmed).map(ParsedLine::Frame)
    } else {
        parse_sample_line(trimmed).map(ParsedLine::Sample)
    };

    parsed.unwrap_or_else(ParsedLine::Unrecognized)
}

/// Parse a sample header line (already trimmed)
///
/// # Errors
/// * `ParseError::MalformedSample` - the line does not have the header shape
/// * `ParseError::InvalidNumber` - pid, tid or timestamp does not parse
pub fn parse_sample_line(line: &str) -> Result<SampleRecord, ParseError> {
    let caps = sample_pattern()
        .captures(line)
        .ok_or(ParseError::MalformedSample)?;

    let comm = caps[1].trim();
    if comm.is_empty() {
        return Err(ParseError::MalformedSample);
    }

    let pid = parse_id("pid", &caps[2])?;
    let tid = parse_id("tid", &caps[3])?;
    let timestamp = caps[4]
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber {
            field: "timestamp",
            value: caps[4].to_string(),
        })?;

    Ok(SampleRecord {
        timestamp,
        pid,
        tid,
        comm: comm.to_string(),
        raw_line: line.to_string(),
    })
}

/// Parse a stack frame line (already trimmed)
///
/// # Errors
/// * `ParseError::MalformedFrame` - no `<hex-ip> <remainder>` shape
pub fn parse_frame_line(line: &str) -> Result<FrameRecord, ParseError> {
    let caps = frame_pattern()
        .captures(line)
        .ok_or(ParseError::MalformedFrame)?;

    let (symbol, dso) = split_symbol_dso(&caps[2]);

    Ok(FrameRecord {
        ip: caps[1].to_string(),
        symbol: symbol.to_string(),
        dso: dso.to_string(),
    })
}

/// Split a frame remainder into symbol and DSO
///
/// The DSO is the last balanced parenthesized group, and only when it closes
/// the remainder. Parentheses inside the symbol (C++ signatures, closures)
/// are left alone:
///
/// ```text
/// foo (/lib/a.so)              -> ("foo", "/lib/a.so")
/// operator()(int) (/lib/b.so)  -> ("operator()(int)", "/lib/b.so")
/// bar                          -> ("bar", "")
/// ```
pub fn split_symbol_dso(remainder: &str) -> (&str, &str) {
    let remainder = remainder.trim();
    let Some(body) = remainder.strip_suffix(')') else {
        return (remainder, "");
    };

    let mut depth = 1usize;
    for (idx, ch) in body.char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return (body[..idx].trim(), body[idx + 1..].trim());
                }
            }
            _ => {}
        }
    }

    // Unbalanced: no group to take as the DSO
    (remainder, "")
}

fn parse_id(field: &'static str, value: &str) -> Result<u32, ParseError> {
    value.parse::<u32>().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
