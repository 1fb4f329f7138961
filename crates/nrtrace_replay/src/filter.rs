//! Per-task filtering of the event stream.

use crate::engine::ReplayEngine;
use crate::report::ReportSink;
use nrtrace_core::{TaskId, TraceResult};
use nrtrace_log::TraceEvent;

/// Re-emits only one task's events, indented by call depth.
///
/// A run of events from other tasks collapses to a single `...` marker,
/// including a run at the very start of the stream.
#[derive(Debug)]
pub struct TaskFilter {
    task: TaskId,
    in_run: bool,
}

impl TaskFilter {
    /// Create a filter for one task
    #[must_use]
    pub fn new(task: TaskId) -> Self {
        Self { task, in_run: true }
    }
}

impl ReplayEngine for TaskFilter {
    fn on_event(&mut self, event: &TraceEvent, sink: &mut dyn ReportSink) -> TraceResult<()> {
        if event.task == self.task {
            sink.line(&format!("{}{}", "  ".repeat(event.depth), event.tokens.join(" ")));
            self.in_run = true;
        } else if self.in_run {
            sink.line("...");
            self.in_run = false;
        }
        Ok(())
    }

    fn finish(&mut self, _sink: &mut dyn ReportSink) -> TraceResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::replay;
    use crate::report::MemorySink;
    use nrtrace_log::TraceStream;

    fn run(log: &str, task: u64) -> MemorySink {
        let mut engine = TaskFilter::new(TaskId::from_raw(task));
        let mut sink = MemorySink::new();
        replay(TraceStream::new(log), &mut engine, &mut sink).unwrap();
        sink
    }

    const LOG: &str = "\
[nros:<2>] read_object
[nros:<1>] write_object
[nros:<1>]   memory_reserve 5
[nros:<2>]   --> done
[nros:<3>] resize_object
[nros:<1>]   --> 5/100
";

    #[test]
    fn test_filter_indents_by_depth() {
        let sink = run(LOG, 1);
        assert_eq!(
            sink.lines,
            vec![
                "...",
                "write_object",
                "  memory_reserve 5",
                "...",
                "  --> 5/100",
            ]
        );
    }

    #[test]
    fn test_interruption_elided_once() {
        let sink = run(LOG, 2);
        assert_eq!(sink.lines, vec!["read_object", "...", "  --> done", "..."]);
    }

    #[test]
    fn test_no_match_collapses_to_one_marker() {
        let sink = run(LOG, 9);
        assert_eq!(sink.lines, vec!["..."]);
    }
}
