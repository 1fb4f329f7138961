//! Trace events and the line parser.
//!
//! A qualifying line looks like `[nros:<7>]   memory_reserve 32`: open
//! marker, task id, id closer, then a space run encoding the nesting
//! depth, then whitespace-delimited tokens. The tracer pads `depth * 2`
//! spaces and its format string contributes one more, so the run length
//! is always `2 * depth + 1`. An even run means the log no longer comes
//! from the tracer we understand.

use nrtrace_core::{TaskId, TraceError, TraceResult};
use serde::{Deserialize, Serialize};

/// Marker opening every qualifying line, up to the task id
pub const OPEN_MARKER: &str = "[nros:<";

/// Marker closing the task id field
pub const ID_CLOSE: &str = ">]";

/// Leading token of a completion line (the result of an earlier request)
pub const COMPLETION_ARROW: &str = "-->";

/// Leading token of a waker-fired line
pub const WAKE_MARKER: &str = "==>";

/// One parsed trace line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Task that emitted the line
    pub task: TaskId,
    /// Nesting depth within the task's call tree
    pub depth: usize,
    /// Whitespace-delimited tokens after the depth run
    pub tokens: Vec<String>,
}

impl TraceEvent {
    /// Leading token, if any
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Tokens after the leading one
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    /// Whether this line reports the result of an earlier request
    #[must_use]
    pub fn is_completion(&self) -> bool {
        self.head() == Some(COMPLETION_ARROW)
    }

    /// Whether the leading token is one of the two structural markers
    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(self.head(), Some(COMPLETION_ARROW | WAKE_MARKER))
    }
}

impl std::fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.task, self.tokens.join(" "))
    }
}

/// Parse one raw line into a trace event.
///
/// Returns `Ok(None)` for lines without both markers - banners and
/// interleaved unrelated output are expected and skipped.
///
/// # Errors
///
/// Returns an error if the id field is not an integer or the depth run
/// has even length.
pub fn parse_line(line: &str) -> TraceResult<Option<TraceEvent>> {
    let Some((_, rest)) = line.split_once(OPEN_MARKER) else {
        return Ok(None);
    };
    let Some((id, rest)) = rest.split_once(ID_CLOSE) else {
        return Ok(None);
    };

    let task = id
        .parse::<u64>()
        .map(TaskId::from_raw)
        .map_err(|_| TraceError::BadTaskId { text: id.to_string() })?;

    let spaces = rest.len() - rest.trim_start_matches(' ').len();
    if spaces % 2 == 0 {
        return Err(TraceError::EvenIndent { spaces });
    }
    let depth = spaces / 2;

    let tokens = rest.split_whitespace().map(str::to_owned).collect();
    Ok(Some(TraceEvent { task, depth, tokens }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_basic() {
        let event = parse_line("[nros:<7>] memory_reserve 32").unwrap().unwrap();
        assert_eq!(event.task, TaskId::from_raw(7));
        assert_eq!(event.depth, 0);
        assert_eq!(event.tokens, vec!["memory_reserve", "32"]);
    }

    #[test]
    fn test_parse_line_depth() {
        let event = parse_line("[nros:<3>]     --> 40/100").unwrap().unwrap();
        assert_eq!(event.depth, 2);
        assert!(event.is_completion());
        assert_eq!(event.args(), ["40/100"]);
    }

    #[test]
    fn test_parse_line_noise() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("starting fuzzer run 3").unwrap(), None);
        // Open marker without the id closer is still noise.
        assert_eq!(parse_line("[nros:<7 banner").unwrap(), None);
    }

    #[test]
    fn test_parse_line_prefixed() {
        // Interleaved output before the marker is ignored.
        let event = parse_line("thread 2: [nros:<1>] done").unwrap().unwrap();
        assert_eq!(event.task, TaskId::from_raw(1));
        assert_eq!(event.tokens, vec!["done"]);
    }

    #[test]
    fn test_parse_line_even_indent() {
        let err = parse_line("[nros:<1>]  alloc 5").unwrap_err();
        assert_eq!(err, TraceError::EvenIndent { spaces: 2 });
        assert!(err.is_structural());
    }

    #[test]
    fn test_parse_line_bad_id() {
        let err = parse_line("[nros:<x>] alloc 5").unwrap_err();
        assert_eq!(err, TraceError::BadTaskId { text: "x".to_string() });
    }

    #[test]
    fn test_wake_marker() {
        let event = parse_line("[nros:<2>] ==> waking up").unwrap().unwrap();
        assert!(event.is_marker());
        assert!(!event.is_completion());
    }

    #[test]
    fn test_empty_token_list() {
        let event = parse_line("[nros:<1>] ").unwrap().unwrap();
        assert_eq!(event.head(), None);
        assert_eq!(event.args(), &[] as &[String]);
    }

    #[test]
    fn test_event_serialization() {
        let event = parse_line("[nros:<5>]   free 100+5").unwrap().unwrap();
        let serialized = serde_json::to_string(&event).unwrap();
        let deserialized: TraceEvent = serde_json::from_str(&serialized).unwrap();
        assert_eq!(event, deserialized);
    }
}
