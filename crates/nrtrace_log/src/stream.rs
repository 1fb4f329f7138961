//! Lazy event stream over one in-memory log.

use crate::event::{parse_line, TraceEvent};
use nrtrace_core::TraceResult;

/// Single-pass event stream borrowing the full raw log.
///
/// Yields events in file order, skipping noise lines. Finite and not
/// restartable; build a new stream from the same text to replay again.
pub struct TraceStream<'a> {
    lines: std::str::Lines<'a>,
    yielded: usize,
}

impl<'a> TraceStream<'a> {
    /// Create a stream over the full log text
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { lines: text.lines(), yielded: 0 }
    }

    /// How many events have been yielded so far
    #[must_use]
    pub fn yielded(&self) -> usize {
        self.yielded
    }
}

impl Iterator for TraceStream<'_> {
    type Item = TraceResult<TraceEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            match parse_line(line) {
                Ok(None) => {}
                Ok(Some(event)) => {
                    self.yielded += 1;
                    return Some(Ok(event));
                }
                Err(err) => {
                    tracing::debug!("line broke the tracer protocol: {err}");
                    return Some(Err(err));
                }
            }
        }
        None
    }
}
