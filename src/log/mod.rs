//! Parsing for the raw DATAMOVE trace log produced by the runtime.

pub mod parse;
pub mod row;

pub use parse::{parse_trace, parse_trace_file};
pub use row::{ComponentKind, LevelCounts, TraceData};
