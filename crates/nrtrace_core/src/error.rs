//! Error domain for trace interpretation.
//!
//! Two classes of failure, both fatal: structural errors mean the log no
//! longer matches the tracer's line protocol; accounting errors mean the
//! replayed totals disagree with values the traced system wrote into the
//! log. Lines without trace markers are noise, not errors.

use crate::id::TaskId;
use thiserror::Error;

/// Result type for trace parsing and replay
pub type TraceResult<T> = Result<T, TraceError>;

/// Error raised while parsing or replaying a trace
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// Leading space run has even length; the tracer always pads `2 * depth + 1`
    #[error("indent of {spaces} spaces is even, tracer pads 2 * depth + 1")]
    EvenIndent {
        /// Length of the leading space run
        spaces: usize,
    },

    /// Task id field is not an integer
    #[error("task id {text:?} is not an integer")]
    BadTaskId {
        /// The raw id field
        text: String,
    },

    /// A numeric trace argument failed to parse
    #[error("{what}: {text:?} is not a number")]
    BadNumber {
        /// Which argument was expected to be numeric
        what: &'static str,
        /// The offending token
        text: String,
    },

    /// The line protocol requires a completion arrow here
    #[error("task {task} must be followed by a completion arrow, got {got:?}")]
    ExpectedCompletion {
        /// Task whose request is awaiting completion
        task: TaskId,
        /// Leading token of the event seen instead
        got: String,
    },

    /// A second reservation/removal arrived while one is still pending
    #[error("task {task} issued {request:?} while a request is still pending")]
    DuplicateRequest {
        /// Task with the still-open request
        task: TaskId,
        /// The duplicate request token
        request: String,
    },

    /// An allocation completed at an address that is still held
    #[error("block {address} allocated twice without an intervening free")]
    DoubleAlloc {
        /// Block address reported by the allocator
        address: u64,
    },

    /// A stop event named a task that was never started
    #[error("stop for task {task} that was never started")]
    StopUnknown {
        /// The unknown task
        task: TaskId,
    },

    /// A stop event arrived at nonzero depth
    #[error("stop for task {task} at depth {depth}, tasks finish at depth 0")]
    StopAtDepth {
        /// Task being stopped
        task: TaskId,
        /// Depth the stop was seen at
        depth: usize,
    },

    /// A stop event named the ambient context
    #[error("stop for the ambient context <0>")]
    StopRootTask,

    /// Replayed running total disagrees with the total embedded in the log
    #[error("total memory is off for task {task}: replayed {replayed}, log says {embedded}")]
    TotalMismatch {
        /// Task whose completion carried the embedded total
        task: TaskId,
        /// Total reconstructed by replay
        replayed: i64,
        /// Total the traced system reported
        embedded: i64,
    },

    /// A free named an address with no live allocation
    #[error("free of block {address} that is not allocated")]
    FreeUnallocated {
        /// Freed address
        address: u64,
    },

    /// A free's block count disagrees with the allocation's
    #[error("free of block {address} with {freed} blocks, allocated with {held}")]
    FreeMismatch {
        /// Freed address
        address: u64,
        /// Count recorded at allocation
        held: u64,
        /// Count named by the free
        freed: u64,
    },
}

impl TraceError {
    /// Whether this is an accounting mismatch rather than a protocol breach
    #[must_use]
    pub const fn is_accounting(&self) -> bool {
        matches!(
            self,
            Self::TotalMismatch { .. } | Self::FreeUnallocated { .. } | Self::FreeMismatch { .. }
        )
    }

    /// Whether the log stopped matching the tracer's line protocol
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !self.is_accounting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TraceError::EvenIndent { spaces: 4 };
        assert_eq!(err.to_string(), "indent of 4 spaces is even, tracer pads 2 * depth + 1");

        let err = TraceError::StopRootTask;
        assert_eq!(err.to_string(), "stop for the ambient context <0>");
    }

    #[test]
    fn test_total_mismatch_cites_both_sides() {
        let err = TraceError::TotalMismatch {
            task: TaskId::from_raw(1),
            replayed: 10,
            embedded: 30,
        };
        let s = err.to_string();
        assert!(s.contains("10"));
        assert!(s.contains("30"));
        assert!(s.contains("<1>"));
    }

    #[test]
    fn test_free_mismatch_cites_both_counts() {
        let err = TraceError::FreeMismatch { address: 100, held: 5, freed: 4 };
        let s = err.to_string();
        assert!(s.contains("100"));
        assert!(s.contains("5"));
        assert!(s.contains("4"));
    }

    #[test]
    fn test_error_classes() {
        assert!(TraceError::EvenIndent { spaces: 2 }.is_structural());
        assert!(
            TraceError::ExpectedCompletion {
                task: TaskId::from_raw(2),
                got: "not".to_string(),
            }
            .is_structural()
        );
        assert!(TraceError::FreeUnallocated { address: 3 }.is_accounting());
        assert!(
            TraceError::TotalMismatch {
                task: TaskId::from_raw(1),
                replayed: 0,
                embedded: 1,
            }
            .is_accounting()
        );
    }
}
