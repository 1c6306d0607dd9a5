//! Typed records produced by the line classifier.
//!
//! These are the in-flight shapes of one trace line. Once written to the
//! store they come back as `StoredSample` / `StoredFrame` with their ids.

use crate::utils::error::ParseError;

/// A sample header line: one point-in-time observation of a thread
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    /// Seconds since an arbitrary epoch, as printed by perf
    pub timestamp: f64,

    pub pid: u32,

    pub tid: u32,

    /// Process/thread name, may contain spaces
    pub comm: String,

    /// The trimmed source line, kept for auditing
    pub raw_line: String,
}

/// An indented stack frame line belonging to the preceding sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    /// Instruction pointer exactly as printed (hex text, never parsed)
    pub ip: String,

    /// Resolved or unresolved symbol name
    pub symbol: String,

    /// Binary or shared object path, empty when perf printed none
    pub dso: String,
}

/// Classification of one raw trace line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Sample(SampleRecord),
    Frame(FrameRecord),
    /// Blank line or `#` comment
    Ignored,
    /// Line matched neither grammar; counted as a parse failure
    Unrecognized(ParseError),
}
