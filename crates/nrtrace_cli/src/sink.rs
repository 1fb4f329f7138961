//! Console report sink.

use nrtrace_replay::ReportSink;

/// Writes report lines and samples straight to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Create a console sink
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReportSink for ConsoleSink {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }

    fn sample(&mut self, value: u64) {
        println!("{value}");
    }
}
