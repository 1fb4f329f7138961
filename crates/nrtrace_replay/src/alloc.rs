//! Block-allocator replay.
//!
//! An `alloc <blocks>` request is answered on the next line by an arrow
//! carrying the block address, or the `N/A` sentinel when the allocator
//! itself was out of space. A `free <address>+<blocks>` must name a live
//! allocation with exactly the recorded block count.

use crate::engine::{num_arg, ReplayEngine};
use crate::report::ReportSink;
use indexmap::IndexMap;
use nrtrace_core::{TaskId, TraceError, TraceResult};
use nrtrace_log::TraceEvent;

/// Address reported when the traced allocator had no space left
const NOT_AVAILABLE: &str = "N/A";

/// Two-state protocol machine for the alloc/arrow line pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Nothing,
    Completion { task: TaskId, blocks: u64 },
}

/// Replays the block ledger and cross-checks frees against allocations
#[derive(Debug)]
pub struct AllocReplay {
    ledger: IndexMap<u64, u64>,
    awaiting: Awaiting,
    halted: bool,
}

impl AllocReplay {
    /// Create an engine with an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self {
            ledger: IndexMap::new(),
            awaiting: Awaiting::Nothing,
            halted: false,
        }
    }

    /// Currently live allocations, address to block count
    #[must_use]
    pub fn ledger(&self) -> &IndexMap<u64, u64> {
        &self.ledger
    }

    /// Whether the replay stopped early because the allocator ran out
    #[must_use]
    pub fn halted(&self) -> bool {
        self.halted
    }

    fn record(&mut self, event: &TraceEvent, blocks: u64, sink: &mut dyn ReportSink) -> TraceResult<()> {
        let address = event.tokens.get(1).map_or("", String::as_str);
        sink.line(&format!("alloc {address}+{blocks}"));
        if address == NOT_AVAILABLE {
            // The traced allocator itself failed; nothing past this point
            // can be trusted to balance.
            tracing::debug!("allocator reported {NOT_AVAILABLE}, halting replay");
            self.halted = true;
            return Ok(());
        }
        let address: u64 = address.parse().map_err(|_| TraceError::BadNumber {
            what: "block address",
            text: address.to_owned(),
        })?;
        if self.ledger.insert(address, blocks).is_some() {
            return Err(TraceError::DoubleAlloc { address });
        }
        Ok(())
    }

    fn free(&mut self, event: &TraceEvent, sink: &mut dyn ReportSink) -> TraceResult<()> {
        let arg = event.tokens.get(1).map_or("", String::as_str);
        let Some((address, blocks)) = arg.split_once('+') else {
            return Err(TraceError::BadNumber { what: "free address+count", text: arg.to_owned() });
        };
        sink.line(&format!("free  {address}+{blocks}"));
        let address: u64 = address.parse().map_err(|_| TraceError::BadNumber {
            what: "free address",
            text: address.to_owned(),
        })?;
        let blocks: u64 = blocks.parse().map_err(|_| TraceError::BadNumber {
            what: "free count",
            text: blocks.to_owned(),
        })?;
        match self.ledger.get(&address) {
            None => Err(TraceError::FreeUnallocated { address }),
            Some(&held) if held != blocks => {
                Err(TraceError::FreeMismatch { address, held, freed: blocks })
            }
            Some(_) => {
                self.ledger.shift_remove(&address);
                Ok(())
            }
        }
    }
}

impl Default for AllocReplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayEngine for AllocReplay {
    fn on_event(&mut self, event: &TraceEvent, sink: &mut dyn ReportSink) -> TraceResult<()> {
        if self.halted {
            return Ok(());
        }

        if let Awaiting::Completion { task, blocks } = self.awaiting {
            if !event.is_completion() {
                return Err(TraceError::ExpectedCompletion {
                    task,
                    got: event.head().unwrap_or_default().to_owned(),
                });
            }
            self.awaiting = Awaiting::Nothing;
            return self.record(event, blocks, sink);
        }

        match event.head() {
            Some("alloc") => {
                let blocks: u64 = num_arg(event, 1, "alloc count")?;
                self.awaiting = Awaiting::Completion { task: event.task, blocks };
                Ok(())
            }
            Some("free") => self.free(event, sink),
            _ => Ok(()),
        }
    }

    fn finish(&mut self, sink: &mut dyn ReportSink) -> TraceResult<()> {
        if let Awaiting::Completion { task, .. } = self.awaiting {
            return Err(TraceError::ExpectedCompletion {
                task,
                got: "end of trace".to_owned(),
            });
        }
        if self.ledger.is_empty() {
            sink.line("no outstanding allocations");
        } else {
            // Still allocated at the end of the window; not necessarily leaks.
            for (address, blocks) in &self.ledger {
                sink.line(&format!("outstanding {address}+{blocks}"));
            }
        }
        Ok(())
    }
}
