//! Group classified lines into samples and their call stacks.
//!
//! The assembler is the only stateful step of ingestion. It remembers the
//! most recent sample and the depth of the next frame, and writes every
//! record to a `FrameSink` as soon as it is seen:
//!
//! ```text
//! java 100/101 10.0:          -> write_sample       (level reset to 0)
//!   1a2b foo (/lib/a.so)      -> write_frame(level 0)
//!   3c4d bar                  -> write_frame(level 1)
//! java 100/102 11.0:          -> write_sample       (level reset to 0)
//! ```
//!
//! Nothing is buffered, so a truncated trace still leaves a valid prefix in
//! the sink and the counters match what was read.

use crate::parser::{parse_line, FrameRecord, ParsedLine, SampleRecord};
use crate::utils::config::MAX_RECORDED_FAILURES;
use log::{debug, warn};
use serde::Serialize;
use std::convert::Infallible;

/// Destination for assembled samples and frames
///
/// **Public** - implemented by the SQLite import transaction and by
/// `TraceBuffer` for in-memory use
pub trait FrameSink {
    type Error;

    /// Persist a sample and return its identifier
    fn write_sample(&mut self, sample: &SampleRecord) -> Result<i64, Self::Error>;

    /// Persist a frame belonging to `sample_id` at depth `level`
    fn write_frame(
        &mut self,
        sample_id: i64,
        level: u32,
        frame: &FrameRecord,
    ) -> Result<(), Self::Error>;
}

/// Counters accumulated over one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub sample_count: u64,

    pub stack_count: u64,

    /// Frame lines seen before any sample line
    pub orphan_frame_count: u64,

    /// Lines that matched neither grammar
    pub parse_failure_count: u64,

    /// 1-based line numbers of the first failures
    pub failed_lines: Vec<usize>,
}

/// Single-pass state machine attaching frames to the latest sample
pub struct TraceAssembler<S: FrameSink> {
    sink: S,
    current_sample: Option<i64>,
    current_level: u32,
    stats: AssemblyStats,
}

impl<S: FrameSink> TraceAssembler<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            current_sample: None,
            current_level: 0,
            stats: AssemblyStats::default(),
        }
    }

    /// Classify and consume one line
    ///
    /// # Arguments
    /// * `line_number` - 1-based position in the source, used for reporting
    /// * `line` - Raw line text with its leading whitespace
    ///
    /// # Errors
    /// Only sink errors. Malformed lines are counted, never returned.
    pub fn feed_line(&mut self, line_number: usize, line: &str) -> Result<(), S::Error> {
        match parse_line(line) {
            ParsedLine::Sample(sample) => {
                let id = self.sink.write_sample(&sample)?;
                self.current_sample = Some(id);
                self.current_level = 0;
                self.stats.sample_count += 1;
            }
            ParsedLine::Frame(frame) => match self.current_sample {
                Some(sample_id) => {
                    self.sink.write_frame(sample_id, self.current_level, &frame)?;
                    self.current_level += 1;
                    self.stats.stack_count += 1;
                }
                None => {
                    debug!("Line {}: stack frame before any sample, skipped", line_number);
                    self.stats.orphan_frame_count += 1;
                }
            },
            ParsedLine::Ignored => {}
            ParsedLine::Unrecognized(reason) => {
                warn!("Line {}: {}", line_number, reason);
                self.stats.parse_failure_count += 1;
                if self.stats.failed_lines.len() < MAX_RECORDED_FAILURES {
                    self.stats.failed_lines.push(line_number);
                }
            }
        }
        Ok(())
    }

    /// Counters so far
    pub fn stats(&self) -> &AssemblyStats {
        &self.stats
    }

    /// End the pass, handing back the sink and the final counters
    pub fn finish(self) -> (S, AssemblyStats) {
        (self.sink, self.stats)
    }
}

/// One sample with the frames that followed it, in level order
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGroup {
    pub sample: SampleRecord,
    pub frames: Vec<FrameRecord>,
}

/// In-memory sink collecting fully formed sample groups
///
/// Sample ids are positions in `groups`.
#[derive(Debug, Default)]
pub struct TraceBuffer {
    pub groups: Vec<SampleGroup>,
}

impl FrameSink for TraceBuffer {
    type Error = Infallible;

    fn write_sample(&mut self, sample: &SampleRecord) -> Result<i64, Self::Error> {
        self.groups.push(SampleGroup {
            sample: sample.clone(),
            frames: Vec::new(),
        });
        Ok(self.groups.len() as i64 - 1)
    }

    fn write_frame(
        &mut self,
        sample_id: i64,
        _level: u32,
        frame: &FrameRecord,
    ) -> Result<(), Self::Error> {
        if let Some(group) = usize::try_from(sample_id)
            .ok()
            .and_then(|idx| self.groups.get_mut(idx))
        {
            group.frames.push(frame.clone());
        }
        Ok(())
    }
}

/// Assemble trace text held in memory
///
/// **Public** - convenience for callers that do not need a store
pub fn assemble_str(text: &str) -> (Vec<SampleGroup>, AssemblyStats) {
    let mut assembler = TraceAssembler::new(TraceBuffer::default());
    for (idx, line) in text.lines().enumerate() {
        assembler
            .feed_line(idx + 1, line)
            .unwrap_or_else(|never| match never {});
    }
    let (buffer, stats) = assembler.finish();
    (buffer.groups, stats)
}
