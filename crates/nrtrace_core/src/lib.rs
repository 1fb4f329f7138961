//! NRTRACE Core Types
//!
//! Pure types with no I/O: task identifiers and the error domain shared
//! by the trace parser and the replay engines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;

// Re-exports
pub use error::{TraceError, TraceResult};
pub use id::TaskId;
