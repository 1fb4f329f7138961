//! Unfinished-task detection.
//!
//! A task opens at its first trace line and closes on a `--> done` arrow
//! at depth 0. Whatever is still open when the stream ends never ran to
//! completion inside the observed window.

use crate::engine::ReplayEngine;
use crate::report::ReportSink;
use indexmap::IndexSet;
use nrtrace_core::{TaskId, TraceError, TraceResult};
use nrtrace_log::TraceEvent;

/// Tracks the set of started-but-not-completed tasks
#[derive(Debug, Default)]
pub struct UnfinishedTasks {
    open: IndexSet<TaskId>,
}

impl UnfinishedTasks {
    /// Create a detector with no open tasks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks currently open
    #[must_use]
    pub fn open(&self) -> &IndexSet<TaskId> {
        &self.open
    }

    fn is_done(event: &TraceEvent) -> bool {
        event.is_completion() && matches!(event.args(), [only] if only == "done")
    }
}

impl ReplayEngine for UnfinishedTasks {
    fn on_event(&mut self, event: &TraceEvent, sink: &mut dyn ReportSink) -> TraceResult<()> {
        if Self::is_done(event) {
            if event.depth != 0 {
                return Err(TraceError::StopAtDepth { task: event.task, depth: event.depth });
            }
            if event.task.is_root() {
                return Err(TraceError::StopRootTask);
            }
            if !self.open.shift_remove(&event.task) {
                return Err(TraceError::StopUnknown { task: event.task });
            }
            sink.line(&format!("stop {}", event.task.as_u64()));
        } else if self.open.insert(event.task) {
            sink.line(&format!("start {}", event.task.as_u64()));
        }
        Ok(())
    }

    fn finish(&mut self, sink: &mut dyn ReportSink) -> TraceResult<()> {
        if self.open.is_empty() {
            sink.line("no unfinished tasks");
        } else {
            let mut ids: Vec<u64> = self.open.iter().map(TaskId::as_u64).collect();
            ids.sort_unstable();
            let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
            sink.line(&format!("unfinished tasks: {}", ids.join(", ")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::replay;
    use crate::report::MemorySink;
    use nrtrace_log::TraceStream;

    fn run(log: &str) -> (TraceResult<()>, MemorySink) {
        let mut engine = UnfinishedTasks::new();
        let mut sink = MemorySink::new();
        let result = replay(TraceStream::new(log), &mut engine, &mut sink);
        (result, sink)
    }

    #[test]
    fn test_all_tasks_finish() {
        let log = "\
[nros:<1>] read_object
[nros:<2>] write_object
[nros:<2>]   memory_reserve 5
[nros:<2>] --> done
[nros:<1>] --> done
";
        let (result, sink) = run(log);
        result.unwrap();
        assert_eq!(
            sink.lines,
            vec!["start 1", "start 2", "stop 2", "stop 1", "no unfinished tasks"]
        );
    }

    #[test]
    fn test_unfinished_tasks_sorted() {
        let log = "\
[nros:<5>] read_object
[nros:<2>] write_object
[nros:<3>] resize_object
[nros:<3>] --> done
";
        let (result, sink) = run(log);
        result.unwrap();
        assert_eq!(sink.lines.last().unwrap(), "unfinished tasks: 2, 5");
    }

    #[test]
    fn test_stop_at_depth_fails() {
        let log = "\
[nros:<1>] read_object
[nros:<1>]   --> done
";
        let (result, _) = run(log);
        assert_eq!(
            result.unwrap_err(),
            TraceError::StopAtDepth { task: TaskId::from_raw(1), depth: 1 }
        );
    }

    #[test]
    fn test_stop_for_root_fails() {
        let (result, _) = run("[nros:<0>] --> done\n");
        assert_eq!(result.unwrap_err(), TraceError::StopRootTask);
    }

    #[test]
    fn test_stop_for_unknown_task_fails() {
        let (result, _) = run("[nros:<4>] --> done\n");
        assert_eq!(
            result.unwrap_err(),
            TraceError::StopUnknown { task: TaskId::from_raw(4) }
        );
    }

    #[test]
    fn test_interleaved_open_close() {
        // Any interleaving respecting open-before-close per id is clean.
        let log = "\
[nros:<1>] a
[nros:<2>] b
[nros:<1>] --> done
[nros:<3>] c
[nros:<3>] --> done
[nros:<2>] --> done
";
        let (result, sink) = run(log);
        result.unwrap();
        assert_eq!(sink.lines.last().unwrap(), "no unfinished tasks");
    }

    #[test]
    fn test_done_deep_in_call_tree_is_not_a_stop() {
        // A completion arrow that is not exactly "done" opens the task
        // like any other first sighting.
        let log = "\
[nros:<1>] a
[nros:<1>]   --> 5/10
[nros:<1>] --> done
";
        let (result, sink) = run(log);
        result.unwrap();
        assert_eq!(sink.lines, vec!["start 1", "stop 1", "no unfinished tasks"]);
    }
}
