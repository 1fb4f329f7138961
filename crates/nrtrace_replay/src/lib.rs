//! NRTRACE Replay Engines
//!
//! Stateful consumers of the trace event stream. Each engine makes one
//! forward pass over one log, reconstructs the state the traced system
//! claimed to have, and fails fast on the first disagreement.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alloc;
pub mod coverage;
pub mod engine;
pub mod filter;
pub mod memory;
pub mod report;
pub mod tasks;

pub use alloc::AllocReplay;
pub use coverage::MethodCoverage;
pub use engine::{replay, ReplayEngine};
pub use filter::TaskFilter;
pub use memory::MemoryReplay;
pub use report::{MemorySink, ReportSink};
pub use tasks::UnfinishedTasks;
