//! Method coverage counting.

use crate::engine::ReplayEngine;
use crate::report::ReportSink;
use nrtrace_core::TraceResult;
use nrtrace_log::TraceEvent;
use std::collections::BTreeMap;

/// Tallies how often each traced method appears in the stream.
///
/// The two structural markers are not methods and are excluded. The
/// sorted map makes the report deterministic without a sort at the end.
#[derive(Debug, Default)]
pub struct MethodCoverage {
    counts: BTreeMap<String, u64>,
}

impl MethodCoverage {
    /// Create a counter with an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Occurrences seen for one method
    #[must_use]
    pub fn count(&self, method: &str) -> u64 {
        self.counts.get(method).copied().unwrap_or(0)
    }
}

impl ReplayEngine for MethodCoverage {
    fn on_event(&mut self, event: &TraceEvent, _sink: &mut dyn ReportSink) -> TraceResult<()> {
        if !event.is_marker() {
            if let Some(head) = event.head() {
                *self.counts.entry(head.to_owned()).or_default() += 1;
            }
        }
        Ok(())
    }

    fn finish(&mut self, sink: &mut dyn ReportSink) -> TraceResult<()> {
        for (method, count) in &self.counts {
            sink.line(&format!("{method} {count}"));
        }
        Ok(())
    }
}
