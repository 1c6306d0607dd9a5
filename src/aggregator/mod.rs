//! Assembly of classified trace lines into samples with call stacks.
//!
//! This module turns the flat line stream into:
//! - Samples with their frames at explicit depths
//! - Import counters (samples, frames, orphans, failures)

pub mod assembler;

// Re-export main types and functions
pub use assembler::{
    assemble_str, AssemblyStats, FrameSink, SampleGroup, TraceAssembler, TraceBuffer,
};
