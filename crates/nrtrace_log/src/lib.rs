//! NRTRACE Trace Log
//!
//! Line parser and lazy event stream over the tracer's text output.
//! Lines without trace markers are skipped as noise; lines that carry the
//! markers but break the line protocol are fatal.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod stream;

pub use event::{parse_line, TraceEvent, COMPLETION_ARROW, WAKE_MARKER};
pub use stream::TraceStream;
