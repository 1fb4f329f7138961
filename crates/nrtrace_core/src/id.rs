//! Task identifiers.
//!
//! Every trace line carries the id of the task that emitted it. Ids are
//! assigned by the traced system's tracer; id 0 is the ambient context
//! used when no task is on the tracer's stack.

use serde::{Deserialize, Serialize};

/// Task identifier - correlates all trace lines of one logical task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// The ambient context, used for lines emitted outside any task
    pub const ROOT: Self = Self(0);

    /// Create from a raw id as it appears in the log
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether this is the ambient context rather than a real task
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.0)
    }
}
