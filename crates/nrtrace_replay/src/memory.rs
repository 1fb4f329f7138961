//! Memory-reservation replay.
//!
//! Reconstructs the traced system's shared memory budget from
//! `memory_reserve` / `remove_memory` requests and their completion
//! arrows, and cross-checks the running total against the `used/limit`
//! value the system wrote into each completion line. This is the
//! system's core correctness check: every accepted request either
//! settles and moves the shared total consistently, or stays visibly
//! pending in the final report.

use crate::engine::{num_arg, ReplayEngine};
use crate::report::ReportSink;
use indexmap::IndexMap;
use nrtrace_core::{TaskId, TraceError, TraceResult};
use nrtrace_log::TraceEvent;
use serde::Serialize;

/// A reservation or removal that has not settled yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reservation {
    /// Depth the request was issued at
    pub depth: usize,
    /// Signed amount: positive for reserve, negative for remove
    pub amount: i64,
    /// Arrival index of the request within the event stream
    pub seq: usize,
}

/// Two-state protocol machine for "the next event must be an arrow".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Nothing,
    Completion(TaskId),
}

/// Replays the shared memory budget and verifies embedded totals
#[derive(Debug)]
pub struct MemoryReplay {
    total: i64,
    max_total: i64,
    pending: IndexMap<TaskId, Reservation>,
    awaiting: Awaiting,
    seq: usize,
}

impl MemoryReplay {
    /// Create an engine with an empty budget
    #[must_use]
    pub fn new() -> Self {
        Self {
            total: 0,
            max_total: 0,
            pending: IndexMap::new(),
            awaiting: Awaiting::Nothing,
            seq: 0,
        }
    }

    /// Running total after the last settled request
    #[must_use]
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Highest total observed so far
    #[must_use]
    pub fn max_total(&self) -> i64 {
        self.max_total
    }

    /// Requests that have not settled yet
    #[must_use]
    pub fn pending(&self) -> &IndexMap<TaskId, Reservation> {
        &self.pending
    }

    fn request(&mut self, event: &TraceEvent, sign: i64, seq: usize) -> TraceResult<()> {
        if self.pending.contains_key(&event.task) {
            return Err(TraceError::DuplicateRequest {
                task: event.task,
                request: event.head().unwrap_or_default().to_owned(),
            });
        }
        let amount: i64 = num_arg(event, 1, "request amount")?;
        self.pending.insert(
            event.task,
            Reservation { depth: event.depth, amount: sign * amount, seq },
        );
        Ok(())
    }

    fn force_grow(&mut self, event: &TraceEvent, sink: &mut dyn ReportSink) -> TraceResult<()> {
        let old: i64 = num_arg(event, 1, "force_grow old size")?;
        let new: i64 = num_arg(event, 2, "force_grow new size")?;
        self.total += new - old;
        self.max_total = self.max_total.max(self.total);
        sink.line(&format!("{} force_grow {} -> {}", event.task, new - old, self.total));
        // The grown total is confirmed by the arrow on the very next line.
        self.awaiting = Awaiting::Completion(event.task);
        Ok(())
    }

    fn settle(&mut self, event: &TraceEvent, sink: &mut dyn ReportSink) -> TraceResult<()> {
        let entry = self.pending[&event.task];
        match event.args() {
            [only] if only == "fail" => {
                // Request denied; the task may retry, so it stays pending.
                sink.line(&format!("{} fail alloc {}", event.task, entry.amount));
                return Ok(());
            }
            [first, second] if first == "not" && second == "finished" => {
                sink.line(&format!("{} unfinished {}", event.task, entry.amount));
                return Ok(());
            }
            [first, ..] if first == "id" => {
                // Sub-annotation, not an outcome.
                return Ok(());
            }
            _ => {}
        }

        self.pending.shift_remove(&event.task);
        self.total += entry.amount;
        self.max_total = self.max_total.max(self.total);
        if entry.amount >= 0 {
            sink.line(&format!("{} alloc {} -> {}", event.task, entry.amount, self.total));
        } else {
            sink.line(&format!("{} free  {} -> {}", event.task, -entry.amount, self.total));
        }

        let token = event.tokens.get(1).map_or("", String::as_str);
        let numerator = token.split('/').next().unwrap_or("");
        let embedded: i64 = numerator.parse().map_err(|_| TraceError::BadNumber {
            what: "embedded total",
            text: token.to_owned(),
        })?;
        if self.total != embedded {
            return Err(TraceError::TotalMismatch {
                task: event.task,
                replayed: self.total,
                embedded,
            });
        }
        Ok(())
    }
}

impl Default for MemoryReplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayEngine for MemoryReplay {
    fn on_event(&mut self, event: &TraceEvent, sink: &mut dyn ReportSink) -> TraceResult<()> {
        let seq = self.seq;
        self.seq += 1;

        if let Awaiting::Completion(task) = self.awaiting {
            if event.task != task || !event.is_completion() {
                return Err(TraceError::ExpectedCompletion {
                    task,
                    got: event.head().unwrap_or_default().to_owned(),
                });
            }
            self.awaiting = Awaiting::Nothing;
            return Ok(());
        }

        match event.head() {
            Some("memory_reserve") => self.request(event, 1, seq),
            Some("remove_memory") => self.request(event, -1, seq),
            Some("force_grow") => self.force_grow(event, sink),
            _ if event.is_completion() && self.pending.contains_key(&event.task) => {
                self.settle(event, sink)
            }
            _ => Ok(()),
        }
    }

    fn finish(&mut self, sink: &mut dyn ReportSink) -> TraceResult<()> {
        if let Awaiting::Completion(task) = self.awaiting {
            return Err(TraceError::ExpectedCompletion {
                task,
                got: "end of trace".to_owned(),
            });
        }

        tracing::debug!(
            total = self.total,
            pending = self.pending.len(),
            "memory replay finished"
        );
        sink.line(&format!("Total: {}", self.total));
        sink.line("Pending:");
        let mut entries: Vec<_> = self.pending.iter().collect();
        entries.sort_by_key(|(_, r)| r.seq);
        for (task, r) in entries {
            sink.line(&format!("{} depth {} amount {}", task, r.depth, r.amount));
        }
        sink.line(&format!("Max reserved: {}", self.max_total));
        Ok(())
    }
}
